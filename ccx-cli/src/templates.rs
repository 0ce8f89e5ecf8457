//! Builtin provider templates for `ccx create --template`.
//!
//! Each template supplies the provider tag, an Anthropic-compatible
//! endpoint, and whether the ambient ANTHROPIC_API_KEY should be
//! cleared on activation (third-party endpoints reject it).

pub struct ProviderTemplate {
    pub name: &'static str,
    pub provider: &'static str,
    pub base_url: &'static str,
    pub model: Option<&'static str>,
    pub clear_anthropic_key: bool,
}

pub const TEMPLATES: &[ProviderTemplate] = &[
    ProviderTemplate {
        name: "anthropic",
        provider: "anthropic",
        base_url: "https://api.anthropic.com",
        model: None,
        clear_anthropic_key: false,
    },
    ProviderTemplate {
        name: "deepseek",
        provider: "deepseek",
        base_url: "https://api.deepseek.com/anthropic",
        model: Some("deepseek-chat"),
        clear_anthropic_key: true,
    },
    ProviderTemplate {
        name: "glm",
        provider: "zhipu",
        base_url: "https://open.bigmodel.cn/api/anthropic",
        model: Some("glm-4.6"),
        clear_anthropic_key: true,
    },
    ProviderTemplate {
        name: "kimi",
        provider: "moonshot",
        base_url: "https://api.moonshot.cn/anthropic",
        model: Some("kimi-k2-0905-preview"),
        clear_anthropic_key: true,
    },
    ProviderTemplate {
        name: "openrouter",
        provider: "openrouter",
        base_url: "https://openrouter.ai/api",
        model: None,
        clear_anthropic_key: true,
    },
];

pub fn find(name: &str) -> Option<&'static ProviderTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template() {
        assert!(find("deepseek").is_some());
        assert!(find("no-such-template").is_none());
    }

    #[test]
    fn test_template_urls_are_https() {
        for t in TEMPLATES {
            assert!(t.base_url.starts_with("https://"), "{}", t.name);
        }
    }
}
