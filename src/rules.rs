use crate::categories::DepartmentCategory;

/// Default keyword table, in evaluation order. Matching is case-insensitive
/// substring containment against the normalized text.
const KEYWORD_RULES: &[(DepartmentCategory, &[&str])] = &[
    (
        DepartmentCategory::Facility,
        &[
            "전등", "형광등", "엘리베이터", "콘센트", "누수", "파손", "수리", "창문", "문",
            "냉난방기", "에어컨",
        ],
    ),
    (
        DepartmentCategory::Environment,
        &["소음", "냄새", "악취", "청결", "미화", "벌레", "분리수거", "흡연", "온도"],
    ),
    (
        DepartmentCategory::It,
        &[
            "와이파이", "wifi", "인터넷", "프린터", "로그인", "계정", "서버", "포털", "메일",
            "pc", "컴퓨터",
        ],
    ),
    (
        DepartmentCategory::Other,
        &["분실", "불친절", "문의", "건의", "민원", "안내"],
    ),
];

const MAX_EVIDENCE_KEYWORDS: usize = 5;

/// Keyword-rule fallback classifier. A label wins only with a strictly
/// higher hit count than every other label; ties (including all-zero) mean
/// no rule applies.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<(DepartmentCategory, Vec<String>)>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_rules(
            KEYWORD_RULES
                .iter()
                .map(|(label, keywords)| {
                    (*label, keywords.iter().map(|kw| kw.to_string()).collect())
                })
                .collect(),
        )
    }

    pub fn with_rules(rules: Vec<(DepartmentCategory, Vec<String>)>) -> Self {
        Self { rules }
    }

    /// Returns the label with the strictly highest keyword hit count, or
    /// `None` when no keyword matches or the maximum is shared.
    pub fn apply(&self, text: &str) -> Option<DepartmentCategory> {
        let normalized = text.to_lowercase();
        let mut best = None;
        let mut best_hits = 0usize;
        let mut tied = false;

        for (label, keywords) in &self.rules {
            let hits = keywords
                .iter()
                .filter(|kw| normalized.contains(&kw.to_lowercase()))
                .count();
            if hits > best_hits {
                best = Some(*label);
                best_hits = hits;
                tied = false;
            } else if hits == best_hits && hits > 0 {
                tied = true;
            }
        }

        if tied { None } else { best }
    }

    /// Matched keywords for `label`, truncated to the first five in table
    /// order.
    pub fn evidence(&self, text: &str, label: DepartmentCategory) -> Vec<String> {
        let normalized = text.to_lowercase();
        self.rules
            .iter()
            .find(|(rule_label, _)| *rule_label == label)
            .map(|(_, keywords)| {
                keywords
                    .iter()
                    .filter(|kw| normalized.contains(&kw.to_lowercase()))
                    .take(MAX_EVIDENCE_KEYWORDS)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
