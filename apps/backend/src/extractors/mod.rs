pub mod path_ids;
pub mod validated_json;
