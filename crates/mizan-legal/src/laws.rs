use anyhow::Result;
use mizan_core::{db::Db, types::LawEntry};

struct Article {
    title: &'static str,
    title_ar: &'static str,
    category: &'static str,
    article_number: &'static str,
    content: &'static str,
    content_ar: &'static str,
}

const BUILTIN: &[Article] = &[
    Article {
        title: "Contract Formation",
        title_ar: "انعقاد العقد",
        category: "civil",
        article_number: "Article 31",
        content: "A contract is concluded when an offer is matched by an acceptance, \
                  subject to any formalities the law prescribes.",
        content_ar: "ينعقد العقد بارتباط الإيجاب بالقبول مع مراعاة ما يقرره القانون من أوضاع معينة.",
    },
    Article {
        title: "Limitation of Civil Claims",
        title_ar: "تقادم الدعوى المدنية",
        category: "civil",
        article_number: "Article 473",
        content: "A claim arising from an unlawful act is not heard after three years from the day \
                  the injured party learned of the damage and of the person responsible.",
        content_ar: "لا تسمع دعوى التعويض الناشئة عن الفعل الضار بعد انقضاء ثلاث سنوات من اليوم الذي علم فيه المضرور بحدوث الضرر وبالمسؤول عنه.",
    },
    Article {
        title: "Employment Contract Termination",
        title_ar: "إنهاء عقد العمل",
        category: "labor",
        article_number: "Article 75",
        content: "Either party to an indefinite employment contract may terminate it for a \
                  legitimate reason by written notice of at least sixty days.",
        content_ar: "يجوز لأي من طرفي عقد العمل غير محدد المدة إنهاؤه لسبب مشروع بموجب إشعار كتابي قبل ستين يوماً على الأقل.",
    },
    Article {
        title: "End of Service Award",
        title_ar: "مكافأة نهاية الخدمة",
        category: "labor",
        article_number: "Article 84",
        content: "On termination the employer pays the worker half a month's wage for each of \
                  the first five years of service and a full month's wage for each later year.",
        content_ar: "إذا انتهت علاقة العمل وجب على صاحب العمل أن يدفع للعامل مكافأة تحسب على أساس أجر نصف شهر عن كل سنة من السنوات الخمس الأولى وأجر شهر عن كل سنة من السنوات التالية.",
    },
    Article {
        title: "Commercial Lease Renewal",
        title_ar: "تجديد عقد الإيجار التجاري",
        category: "commercial",
        article_number: "Article 12",
        content: "A commercial lease renews for the same term unless either party gives notice \
                  of non-renewal at least ninety days before it expires.",
        content_ar: "يتجدد عقد الإيجار التجاري لمدة مماثلة ما لم يخطر أحد الطرفين الآخر بعدم رغبته في التجديد قبل تسعين يوماً على الأقل من انتهاء مدته.",
    },
    Article {
        title: "Appeal Deadline",
        title_ar: "ميعاد الاستئناف",
        category: "procedure",
        article_number: "Article 187",
        content: "The period for appealing a first-instance judgment is thirty days from the date \
                  the judgment is delivered.",
        content_ar: "مدة الاعتراض بطلب الاستئناف ثلاثون يوماً من تاريخ تسليم صورة صك الحكم.",
    },
];

/// The bilingual articles shipped with the server.
pub fn builtin_laws() -> Vec<LawEntry> {
    BUILTIN
        .iter()
        .map(|a| LawEntry {
            id: 0,
            title: a.title.into(),
            title_ar: a.title_ar.into(),
            category: a.category.into(),
            article_number: a.article_number.into(),
            content: a.content.into(),
            content_ar: a.content_ar.into(),
        })
        .collect()
}

/// Insert the built-in articles if the law table is empty. Returns rows added.
pub fn seed_laws(db: &Db) -> Result<usize> {
    if db.count_laws()? > 0 {
        return Ok(0);
    }
    let laws = builtin_laws();
    for law in &laws {
        db.insert_law(law)?;
    }
    tracing::info!("seeded {} law articles", laws.len());
    Ok(laws.len())
}
