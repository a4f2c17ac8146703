use pipeline::Rules;

use super::{CreateZone, FindZone, UpdateZone};

const CODE_MAX_LEN: usize = 10;
const NAME_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 500;

fn is_code_like(code: &str) -> bool {
    code.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn create_zone_rules() -> Rules<CreateZone> {
    Rules::new()
        .not_blank("code", |r: &CreateZone| r.code.as_str())
        .max_len("code", CODE_MAX_LEN, |r: &CreateZone| r.code.trim())
        .rule("code", "may only contain letters, digits, '-' and '_'", |r| {
            is_code_like(&r.code)
        })
        .not_blank("name", |r: &CreateZone| r.name.as_str())
        .max_len("name", NAME_MAX_LEN, |r: &CreateZone| r.name.as_str())
        .max_len("description", DESCRIPTION_MAX_LEN, |r: &CreateZone| {
            r.description.as_deref().unwrap_or_default()
        })
        .when(|r| r.description.is_some())
}

pub fn update_zone_rules() -> Rules<UpdateZone> {
    Rules::new()
        .not_blank("name", |r: &UpdateZone| r.name.as_str())
        .max_len("name", NAME_MAX_LEN, |r: &UpdateZone| r.name.as_str())
        .max_len("description", DESCRIPTION_MAX_LEN, |r: &UpdateZone| {
            r.description.as_deref().unwrap_or_default()
        })
        .when(|r| r.description.is_some())
}

pub fn find_zone_rules() -> Rules<FindZone> {
    Rules::new()
        .cross_field(&["id", "code"], "exactly one of id or code is required", |r: &FindZone| {
            r.id.is_some() != r.code.is_some()
        })
        .not_blank("code", |r: &FindZone| r.code.as_deref().unwrap_or_default())
        .when(|r| r.code.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{ValidationFailure, Validator};

    fn check<R>(rules: &Rules<R>, request: &R) -> ValidationFailure {
        rules.validate(request).into_iter().collect()
    }

    #[test]
    fn create_without_name_fails_on_name() {
        let request = CreateZone {
            code: "EU".to_string(),
            name: String::new(),
            description: None,
        };
        let failure = check(&create_zone_rules(), &request);
        assert_eq!(failure.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn create_rejects_bad_codes() {
        let request = CreateZone {
            code: "EU WEST ZONE!".to_string(),
            name: "Europe".to_string(),
            description: None,
        };
        let failure = check(&create_zone_rules(), &request);
        assert_eq!(failure.messages("code").len(), 2);
    }

    #[test]
    fn find_needs_exactly_one_criterion() {
        let rules = find_zone_rules();
        assert!(check(&rules, &FindZone::default()).contains("id"));

        let both = FindZone {
            id: Some(common::AggregateId::new()),
            code: Some("EU".to_string()),
        };
        assert!(check(&rules, &both).contains("code"));

        let by_code = FindZone {
            code: Some("EU".to_string()),
            ..Default::default()
        };
        assert!(check(&rules, &by_code).is_empty());
    }
}
