// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    tokenizer: TokenizerLimits,
    codec: CodecLimits,
    resolution: ResolutionLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct TokenizerLimits {
    max_value_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct CodecLimits {
    default_line_length: u32,
    read_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct ResolutionLimits {
    max_search_depth: usize,
    max_visited_nodes: usize,
    max_type_name_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=BUNDLE_UTIL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=BUNDLE_UTIL_CONFIG_DIR");

    let profile =
        env::var("BUNDLE_UTIL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("BUNDLE_UTIL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the bundle_util directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_VALUE_LENGTH: usize = 100_000_000;
    const ABSOLUTE_MAX_SEARCH_DEPTH: usize = 10_000;

    if config.tokenizer.max_value_length == 0 || config.tokenizer.max_token_count == 0 {
        panic!("tokenizer limits must be non-zero");
    }

    if config.tokenizer.max_value_length > ABSOLUTE_MAX_VALUE_LENGTH {
        panic!("SECURITY: max_value_length exceeds absolute maximum");
    }

    if config.codec.default_line_length % 4 != 0 {
        panic!(
            "codec.default_line_length must be a multiple of 4, found {}",
            config.codec.default_line_length
        );
    }

    if config.codec.read_buffer_size == 0 {
        panic!("codec.read_buffer_size must be non-zero");
    }

    // Deep recursion in the resolver must stay well inside the thread stack
    if config.resolution.max_search_depth == 0
        || config.resolution.max_search_depth > ABSOLUTE_MAX_SEARCH_DEPTH
    {
        panic!("SECURITY: max_search_depth must be between 1 and {ABSOLUTE_MAX_SEARCH_DEPTH}");
    }

    if config.resolution.max_visited_nodes < config.resolution.max_search_depth {
        panic!("max_visited_nodes must be at least max_search_depth");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.tokenizer.max_value_length > 10_000_000 {
        panic!("PRODUCTION: max_value_length too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod tokenizer {{
        pub const MAX_VALUE_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod codec {{
        pub const DEFAULT_LINE_LENGTH: u32 = {};
        pub const READ_BUFFER_SIZE: usize = {};
    }}

    pub mod resolution {{
        pub const MAX_SEARCH_DEPTH: usize = {};
        pub const MAX_VISITED_NODES: usize = {};
        pub const MAX_TYPE_NAME_LENGTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.tokenizer.max_value_length,
        config.tokenizer.max_token_count,
        config.codec.default_line_length,
        config.codec.read_buffer_size,
        config.resolution.max_search_depth,
        config.resolution.max_visited_nodes,
        config.resolution.max_type_name_length,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
