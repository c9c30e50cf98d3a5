use serde::{Deserialize, Serialize};

/// 调研报告的目标语言
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "ru")]
    Russian,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::Chinese => write!(f, "zh"),
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Japanese => write!(f, "ja"),
            TargetLanguage::Korean => write!(f, "ko"),
            TargetLanguage::German => write!(f, "de"),
            TargetLanguage::French => write!(f, "fr"),
            TargetLanguage::Russian => write!(f, "ru"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" | "chinese" | "中文" => Ok(TargetLanguage::Chinese),
            "en" | "english" | "英文" => Ok(TargetLanguage::English),
            "ja" | "japanese" | "日本語" | "日文" => Ok(TargetLanguage::Japanese),
            "ko" | "korean" | "한국어" | "韩文" => Ok(TargetLanguage::Korean),
            "de" | "german" | "deutsch" | "德文" => Ok(TargetLanguage::German),
            "fr" | "french" | "français" | "法文" => Ok(TargetLanguage::French),
            "ru" | "russian" | "русский" | "俄文" => Ok(TargetLanguage::Russian),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "中文",
            TargetLanguage::English => "English",
            TargetLanguage::Japanese => "日本語",
            TargetLanguage::Korean => "한국어",
            TargetLanguage::German => "Deutsch",
            TargetLanguage::French => "Français",
            TargetLanguage::Russian => "Русский",
        }
    }

    /// 追加到每个系统提示词末尾的语言指令
    pub fn prompt_instruction(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "请使用中文撰写，确保语言表达准确、专业、易于理解。",
            TargetLanguage::English => {
                "Please write in English, ensuring accurate, professional, and easy-to-understand language."
            }
            TargetLanguage::Japanese => {
                "日本語で作成してください。正確で専門的で理解しやすい言語表現を心がけてください。"
            }
            TargetLanguage::Korean => {
                "한국어로 작성해 주세요. 정확하고 전문적이며 이해하기 쉬운 언어 표현을 사용해 주세요."
            }
            TargetLanguage::German => {
                "Bitte schreiben Sie auf Deutsch und stellen Sie sicher, dass die Sprache präzise, professionell und leicht verständlich ist."
            }
            TargetLanguage::French => {
                "Veuillez rédiger en français, en vous assurant que le langage soit précis, professionnel et facile à comprendre."
            }
            TargetLanguage::Russian => {
                "Пожалуйста, пишите на русском языке, обеспечив точность, профессионализм и понятность изложения."
            }
        }
    }

    /// 报告中"来源"章节的本地化标题
    pub fn sources_heading(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "参考来源",
            TargetLanguage::English => "Sources",
            TargetLanguage::Japanese => "出典",
            TargetLanguage::Korean => "출처",
            TargetLanguage::German => "Quellen",
            TargetLanguage::French => "Sources",
            TargetLanguage::Russian => "Источники",
        }
    }

    /// 没有检索到任何来源时写入"来源"章节的说明
    pub fn no_sources_notice(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "未检索到外部来源。",
            TargetLanguage::English => "No external sources were retrieved.",
            TargetLanguage::Japanese => "外部の出典は取得されませんでした。",
            TargetLanguage::Korean => "외부 출처를 찾지 못했습니다.",
            TargetLanguage::German => "Es wurden keine externen Quellen gefunden.",
            TargetLanguage::French => "Aucune source externe n'a été trouvée.",
            TargetLanguage::Russian => "Внешние источники не найдены.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TargetLanguage;

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(TargetLanguage::default(), TargetLanguage::English);
        assert_eq!(TargetLanguage::default().sources_heading(), "Sources");
    }

    #[test]
    fn test_target_language_from_str() {
        assert_eq!(
            "en".parse::<TargetLanguage>().unwrap(),
            TargetLanguage::English
        );
        assert_eq!(
            "Deutsch".parse::<TargetLanguage>().unwrap(),
            TargetLanguage::German
        );
        assert_eq!(
            "中文".parse::<TargetLanguage>().unwrap(),
            TargetLanguage::Chinese
        );
        assert!("klingon".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn test_target_language_display_roundtrip() {
        for lang in [
            TargetLanguage::Chinese,
            TargetLanguage::English,
            TargetLanguage::Japanese,
            TargetLanguage::Korean,
            TargetLanguage::German,
            TargetLanguage::French,
            TargetLanguage::Russian,
        ] {
            assert_eq!(lang.to_string().parse::<TargetLanguage>().unwrap(), lang);
        }
    }
}
