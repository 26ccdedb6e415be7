use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_ai_env() {
    unsafe {
        for var in [
            "ANTHROPIC_API_KEY",
            "ANTHROPIC_MODEL",
            "ANTHROPIC_BASE_URL",
            "GEMINI_API_KEY",
            "GEMINI_MODEL",
            "GEMINI_BASE_URL",
            "LLM_REQUEST_TIMEOUT_SECS",
            "LLM_CONNECT_TIMEOUT_SECS",
            "AI_MAX_TOKENS",
            "AI_WEB_SEARCH_MAX_USES",
            "AI_REQUEST_DEADLINE_SECS",
        ] {
            std::env::remove_var(var);
        }
    }
}

#[test]
fn from_env_defaults_without_keys() {
    unsafe { clear_ai_env() };

    let cfg = AiConfig::from_env();
    assert_eq!(cfg.anthropic.api_key, None);
    assert!(!cfg.anthropic.is_configured());
    assert_eq!(cfg.anthropic.model, DEFAULT_ANTHROPIC_MODEL);
    assert_eq!(cfg.anthropic.base_url, DEFAULT_ANTHROPIC_BASE_URL);
    assert_eq!(cfg.gemini.api_key, None);
    assert_eq!(cfg.gemini.model, DEFAULT_GEMINI_MODEL);
    assert_eq!(cfg.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.max_tokens, DEFAULT_AI_MAX_TOKENS);
    assert_eq!(cfg.web_search_max_uses, DEFAULT_AI_WEB_SEARCH_MAX_USES);
    assert_eq!(cfg.request_deadline_secs, DEFAULT_AI_REQUEST_DEADLINE_SECS);

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_parses_overrides() {
    unsafe {
        clear_ai_env();
        std::env::set_var("ANTHROPIC_API_KEY", "sk-ant");
        std::env::set_var("ANTHROPIC_MODEL", "claude-sonnet-4-5");
        std::env::set_var("GEMINI_API_KEY", " gm-key ");
        std::env::set_var("GEMINI_BASE_URL", "http://localhost:9999/");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
        std::env::set_var("AI_MAX_TOKENS", "1024");
        std::env::set_var("AI_WEB_SEARCH_MAX_USES", "2");
        std::env::set_var("AI_REQUEST_DEADLINE_SECS", "30");
    }

    let cfg = AiConfig::from_env();
    assert_eq!(cfg.anthropic.api_key.as_deref(), Some("sk-ant"));
    assert_eq!(cfg.anthropic.model, "claude-sonnet-4-5");
    assert_eq!(cfg.gemini.api_key.as_deref(), Some("gm-key"));
    assert_eq!(cfg.gemini.base_url, "http://localhost:9999");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.max_tokens, 1024);
    assert_eq!(cfg.web_search_max_uses, 2);
    assert_eq!(cfg.request_deadline_secs, 30);

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_blank_key_counts_as_missing() {
    unsafe {
        clear_ai_env();
        std::env::set_var("ANTHROPIC_API_KEY", "   ");
    }

    let cfg = AiConfig::from_env();
    assert!(!cfg.anthropic.is_configured());

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_invalid_numbers_fall_back_to_defaults() {
    unsafe {
        clear_ai_env();
        std::env::set_var("AI_MAX_TOKENS", "lots");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "-1");
    }

    let cfg = AiConfig::from_env();
    assert_eq!(cfg.max_tokens, DEFAULT_AI_MAX_TOKENS);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);

    unsafe { clear_ai_env() };
}

#[test]
fn from_env_blank_base_urls_fall_back_to_defaults() {
    unsafe {
        clear_ai_env();
        std::env::set_var("ANTHROPIC_BASE_URL", "");
        std::env::set_var("GEMINI_BASE_URL", "  ");
        std::env::set_var("GEMINI_MODEL", "");
    }

    let cfg = AiConfig::from_env();
    assert_eq!(cfg.anthropic.base_url, DEFAULT_ANTHROPIC_BASE_URL);
    assert_eq!(cfg.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.gemini.model, DEFAULT_GEMINI_MODEL);

    unsafe { clear_ai_env() };
}
