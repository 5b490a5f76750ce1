use serde::{Deserialize, Serialize};

/// 目标语言类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Chinese => write!(f, "zh"),
            TargetLanguage::Japanese => write!(f, "ja"),
            TargetLanguage::Korean => write!(f, "ko"),
            TargetLanguage::German => write!(f, "de"),
            TargetLanguage::French => write!(f, "fr"),
            TargetLanguage::Spanish => write!(f, "es"),
            TargetLanguage::Italian => write!(f, "it"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" | "英文" => Ok(TargetLanguage::English),
            "zh" | "chinese" | "中文" => Ok(TargetLanguage::Chinese),
            "ja" | "japanese" | "日本語" | "日文" => Ok(TargetLanguage::Japanese),
            "ko" | "korean" | "한국어" | "韩文" => Ok(TargetLanguage::Korean),
            "de" | "german" | "deutsch" | "德文" => Ok(TargetLanguage::German),
            "fr" | "french" | "français" | "法文" => Ok(TargetLanguage::French),
            "es" | "spanish" | "español" | "西班牙文" => Ok(TargetLanguage::Spanish),
            "it" | "italian" | "italiano" | "意大利文" => Ok(TargetLanguage::Italian),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Chinese => "中文",
            TargetLanguage::Japanese => "日本語",
            TargetLanguage::Korean => "한국어",
            TargetLanguage::German => "Deutsch",
            TargetLanguage::French => "Français",
            TargetLanguage::Spanish => "Español",
            TargetLanguage::Italian => "Italiano",
        }
    }

    /// 追加到系统提示词末尾的语言指令
    pub fn prompt_instruction(&self) -> String {
        format!(
            "Write every piece of reader-facing text in {} ({}). Keep JSON keys, slugs and HTML tags in English.",
            self.english_name(),
            self.display_name()
        )
    }

    fn english_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Chinese => "Simplified Chinese",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::Korean => "Korean",
            TargetLanguage::German => "German",
            TargetLanguage::French => "French",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::Italian => "Italian",
        }
    }

    /// FAQ区块的标题
    pub fn faq_heading(&self) -> &'static str {
        match self {
            TargetLanguage::English => "Frequently Asked Questions",
            TargetLanguage::Chinese => "常见问题",
            TargetLanguage::Japanese => "よくある質問",
            TargetLanguage::Korean => "자주 묻는 질문",
            TargetLanguage::German => "Häufig gestellte Fragen",
            TargetLanguage::French => "Questions fréquentes",
            TargetLanguage::Spanish => "Preguntas frecuentes",
            TargetLanguage::Italian => "Domande frequenti",
        }
    }
}
