/// Default configuration written by `blogmark init`. Every value shown is the
/// built-in default, so an untouched file changes nothing.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# blogmark configuration

[markdown]
# GitHub Flavored Markdown: tables, strikethrough, task lists, autolinks
gfm = true

# Line-based syntax highlighting of fenced code blocks
highlight_code = true

# Theme used for highlighting
highlight_theme = "InspiredGitHub"

# Turn paragraphs holding only a URL into link-card placeholders
link_cards = true

# Documents nested deeper than this are shown as escaped plain text
max_nesting_depth = 64

[server]
# Address `blogmark serve` listens on
bind = "127.0.0.1:8787"

# Origins allowed to call the OGP endpoint (empty allows any origin)
allowed_origins = []

[ogp]
# Upper bound in seconds for fetching one page
timeout_secs = 5

# Pages larger than this many bytes are rejected
max_body_bytes = 1048576

# User-Agent sent to upstream sites
# user_agent = "blogmark-ogp/0.1.0 (+link preview fetcher)"

# Each client may make `rate_limit_max_requests` lookups per window
rate_limit_window_secs = 60
rate_limit_max_requests = 30
"#;
