use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    // The section gate is meaningless without at least one content tag
    let tags = table
        .get("sections")
        .and_then(|s| s.get("content_tags"))
        .and_then(|t| t.as_array());
    if tags.is_none_or(|t| t.is_empty()) {
        panic!("default_config.toml: [sections] content_tags must be a non-empty array");
    }
}
