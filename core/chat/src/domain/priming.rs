//! 初回メッセージ前に履歴へ入れる anchor（データ読み込みのやり取り）

use super::Turn;

const DATA_HEADER: &str = "## Business Report Data:";
const DATA_FOOTER: &str =
    "Remember this data for our conversation. Answer the user's questions based on this information.";
const ACKNOWLEDGEMENT: &str = "I understand. I have the Ecocutlery business report data loaded. I'm ready to answer your questions about product performance, sales, and metrics.";

/// システムプロンプトとレポートデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Priming {
    system_prompt: String,
    report_data: String,
}

impl Priming {
    pub fn new(system_prompt: impl Into<String>, report_data: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            report_data: report_data.into(),
        }
    }

    /// anchor となる user / assistant の 2 ターン
    pub fn anchor_turns(&self) -> [Turn; 2] {
        let user = format!(
            "{}\n\n{}\n\n{}\n\n{}",
            self.system_prompt, DATA_HEADER, self.report_data, DATA_FOOTER
        );
        [Turn::user(user), Turn::assistant(ACKNOWLEDGEMENT)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::turn::Role;

    #[test]
    fn test_anchor_turns_layout() {
        let p = Priming::new("You are an analyst.", "product,units\nfork,10");
        let [user, assistant] = p.anchor_turns();
        assert_eq!(user.role(), Role::User);
        assert_eq!(
            user.content(),
            "You are an analyst.\n\n## Business Report Data:\n\nproduct,units\nfork,10\n\nRemember this data for our conversation. Answer the user's questions based on this information."
        );
        assert_eq!(assistant.role(), Role::Assistant);
        assert!(assistant.content().starts_with("I understand."));
    }
}
