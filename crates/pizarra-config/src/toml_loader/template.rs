//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Pizarra Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[hub]
url = "http://localhost:3000"
# socket_path = "/socket.io/"
# connect_timeout_secs = 15      # 1-120
# reconnect_delay_secs = 1       # 1-60
# max_reconnect_delay_secs = 30  # >= reconnect_delay_secs, <= 600

[directory]
base_url = "http://localhost:3000/api"
# timeout_secs = 30              # 1-300

[session]
# disconnect_on_leave = true
# event_capacity = 256           # 1-65536

[logging]
# level = "INFO"                 # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
