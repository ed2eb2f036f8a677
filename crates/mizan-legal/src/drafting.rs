//! Document drafting from built-in bilingual templates.
//!
//! Templates contain `{{field}}` placeholders. Rendering substitutes every
//! placeholder from the caller's field map and fails if any is left without
//! a value.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use mizan_core::types::Language;
use serde::Serialize;

pub struct Template {
    pub name: &'static str,
    pub label: &'static str,
    pub language: Language,
    pub body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftedDocument {
    pub template: String,
    pub language: Language,
    pub content: String,
}

const DEMAND_LETTER_EN: &str = "\
Date: {{date}}

To: {{recipient_name}}

Subject: Formal Demand for Payment

Dear {{recipient_name}},

On behalf of {{sender_name}}, we hereby demand payment of {{amount}} owed in \
connection with {{description}}. Payment must be received no later than \
{{due_date}}. Failing that, our client reserves the right to pursue all legal \
remedies without further notice.

Sincerely,
{{sender_name}}
";

const DEMAND_LETTER_AR: &str = "\
التاريخ: {{date}}

إلى: {{recipient_name}}

الموضوع: إنذار رسمي بالسداد

السيد/ {{recipient_name}} المحترم،

بالنيابة عن {{sender_name}}، نطالبكم بسداد مبلغ {{amount}} المستحق فيما يتعلق بـ \
{{description}}، على أن يتم السداد في موعد أقصاه {{due_date}}. وفي حال عدم السداد \
يحتفظ موكلنا بحقه في اتخاذ جميع الإجراءات النظامية دون إشعار آخر.

وتفضلوا بقبول فائق الاحترام،
{{sender_name}}
";

const POWER_OF_ATTORNEY_EN: &str = "\
POWER OF ATTORNEY

I, {{principal_name}}, holder of identification number {{principal_id}}, hereby \
appoint {{agent_name}}, holder of identification number {{agent_id}}, as my lawful \
attorney to act on my behalf in the following matters: {{scope}}.

This power of attorney is effective from {{date}} until revoked in writing.

Signature: ____________________
{{principal_name}}
";

const POWER_OF_ATTORNEY_AR: &str = "\
وكالة

أنا الموقع أدناه {{principal_name}}، حامل هوية رقم {{principal_id}}، أوكل \
{{agent_name}}، حامل هوية رقم {{agent_id}}، وكيلاً عني في الأمور التالية: {{scope}}.

تسري هذه الوكالة اعتباراً من {{date}} ما لم يتم إلغاؤها كتابةً.

التوقيع: ____________________
{{principal_name}}
";

const LEASE_AGREEMENT_EN: &str = "\
LEASE AGREEMENT

This lease is made between {{landlord_name}} (the Landlord) and {{tenant_name}} \
(the Tenant) for the property located at {{property_address}}.

1. Term: {{term_months}} months beginning {{start_date}}.
2. Rent: {{monthly_rent}} payable monthly in advance.
3. The Tenant shall use the property for lawful purposes only and return it in \
its original condition, fair wear and tear excepted.

Landlord: {{landlord_name}}        Tenant: {{tenant_name}}
";

const LEASE_AGREEMENT_AR: &str = "\
عقد إيجار

أُبرم هذا العقد بين {{landlord_name}} (المؤجر) و{{tenant_name}} (المستأجر) \
للعقار الواقع في {{property_address}}.

١. المدة: {{term_months}} شهراً تبدأ من {{start_date}}.
٢. الأجرة: {{monthly_rent}} تُدفع شهرياً مقدماً.
٣. يلتزم المستأجر باستعمال العقار في الأغراض المشروعة فقط وإعادته بالحالة التي \
تسلمه عليها مع مراعاة الاستهلاك المعتاد.

المؤجر: {{landlord_name}}        المستأجر: {{tenant_name}}
";

pub fn templates() -> Vec<Template> {
    vec![
        Template {
            name: "demand_letter",
            label: "Demand Letter",
            language: Language::En,
            body: DEMAND_LETTER_EN,
        },
        Template {
            name: "demand_letter",
            label: "إنذار بالسداد",
            language: Language::Ar,
            body: DEMAND_LETTER_AR,
        },
        Template {
            name: "power_of_attorney",
            label: "Power of Attorney",
            language: Language::En,
            body: POWER_OF_ATTORNEY_EN,
        },
        Template {
            name: "power_of_attorney",
            label: "وكالة",
            language: Language::Ar,
            body: POWER_OF_ATTORNEY_AR,
        },
        Template {
            name: "lease_agreement",
            label: "Lease Agreement",
            language: Language::En,
            body: LEASE_AGREEMENT_EN,
        },
        Template {
            name: "lease_agreement",
            label: "عقد إيجار",
            language: Language::Ar,
            body: LEASE_AGREEMENT_AR,
        },
    ]
}

pub fn find_template(name: &str, language: Language) -> Option<Template> {
    templates()
        .into_iter()
        .find(|t| t.name == name && t.language == language)
}

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholders(body: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        let name = after[..end].trim().to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[end + 2..];
    }
    names
}

/// Substitute every placeholder in `body`. Blank values count as missing.
pub fn render(body: &str, fields: &HashMap<String, String>) -> Result<String> {
    let missing: Vec<String> = placeholders(body)
        .into_iter()
        .filter(|name| fields.get(name).map_or(true, |v| v.trim().is_empty()))
        .collect();
    if !missing.is_empty() {
        bail!("Missing values for: {}", missing.join(", "));
    }

    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        out.push_str(&rest[..start]);
        let name = after[..end].trim();
        match fields.get(name) {
            Some(value) => out.push_str(value.trim()),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

pub fn draft_document(
    name: &str,
    language: Language,
    fields: &HashMap<String, String>,
) -> Result<DraftedDocument> {
    let template = find_template(name, language)
        .ok_or_else(|| anyhow!("Unknown document template: {name}"))?;
    let content = render(template.body, fields)?;
    tracing::info!(template = name, language = language.code(), "document drafted");
    Ok(DraftedDocument {
        template: name.to_string(),
        language,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_ordered_and_deduplicated() {
        assert_eq!(
            placeholders("{{a}} and {{ b }} then {{a}} {{c}}"),
            vec!["a", "b", "c"]
        );
        assert!(placeholders("no fields {{ unclosed").is_empty());
    }

    #[test]
    fn every_template_exists_in_both_languages() {
        for name in ["demand_letter", "power_of_attorney", "lease_agreement"] {
            let en = find_template(name, Language::En).unwrap();
            let ar = find_template(name, Language::Ar).unwrap();
            assert_eq!(placeholders(en.body), placeholders(ar.body), "{name}");
        }
    }
}
