use pipeline::Rules;

use super::{CreateCorridor, PatchCorridor, UpdateCorridor};

const NAME_MAX_LEN: usize = 100;

pub fn create_corridor_rules() -> Rules<CreateCorridor> {
    Rules::new()
        .not_blank("name", |r: &CreateCorridor| r.name.as_str())
        .max_len("name", NAME_MAX_LEN, |r: &CreateCorridor| r.name.as_str())
        .cross_field(
            &["source_zone_id", "destination_zone_id"],
            "source and destination zones must differ",
            |r: &CreateCorridor| r.source_zone_id != r.destination_zone_id,
        )
        .rule("valid_to", "must be after valid_from", |r: &CreateCorridor| {
            match (r.valid_from, r.valid_to) {
                (Some(from), Some(to)) => to > from,
                _ => true,
            }
        })
}

pub fn update_corridor_rules() -> Rules<UpdateCorridor> {
    Rules::new()
        .not_blank("name", |r: &UpdateCorridor| r.name.as_str())
        .max_len("name", NAME_MAX_LEN, |r: &UpdateCorridor| r.name.as_str())
        .rule("valid_to", "must be after valid_from", |r: &UpdateCorridor| {
            r.valid_to.is_none_or(|to| to > r.valid_from)
        })
}

pub fn patch_corridor_rules() -> Rules<PatchCorridor> {
    Rules::new()
        .cross_field(
            &["name", "is_enabled", "valid_to"],
            "at least one field must be supplied",
            |r: &PatchCorridor| r.name.is_some() || r.is_enabled.is_some() || r.valid_to.is_some(),
        )
        .not_blank("name", |r: &PatchCorridor| r.name.as_deref().unwrap_or_default())
        .when(|r| r.name.is_some())
        .max_len("name", NAME_MAX_LEN, |r: &PatchCorridor| {
            r.name.as_deref().unwrap_or_default()
        })
}
