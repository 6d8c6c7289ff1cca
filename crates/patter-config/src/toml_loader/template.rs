//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r#"# Patter Configuration
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 8000
# session_scope = "process"   # process: one log for the whole run
#                             # connection: one log per connection

[log]
# dir = "logs"                # chat<session>.json records live here

[generation]
# base_url = "http://localhost:11434"
# model = "deepseek-r1:8b"
# timeout_secs = 120
# connect_timeout_secs = 10
# system_prompt = "You are a patient presenting to a clinic."

[markup]
# begin = "<think>"
# end = "</think>"
"#
}
