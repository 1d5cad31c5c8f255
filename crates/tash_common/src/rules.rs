//! Declarative rule index mapping situation categories to template ids.
//!
//! The same table is rendered into the consult prompt as instructional priors
//! and evaluated directly as a deterministic pre-filter, so the routing logic
//! can be regression-tested without any model in the loop.

/// One if/then rule: narrative patterns that point at specific templates.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub category: &'static str,
    /// Lowercase substrings; any hit fires the rule.
    pub patterns: &'static [&'static str],
    pub template_ids: &'static [&'static str],
    pub note: &'static str,
}

/// Versioned table of eligibility rules.
#[derive(Debug, Clone)]
pub struct RuleIndex {
    entries: Vec<RuleEntry>,
}

const BUILTIN_RULES: &[RuleEntry] = &[
    // Lone soldiers
    RuleEntry {
        category: "lone_soldier",
        patterns: &["parents abroad", "parents overseas", "family abroad", "immigrated alone"],
        template_ids: &["lone-soldier-muvhak"],
        note: "Parents living permanently abroad indicates a recognized lone soldier",
    },
    RuleEntry {
        category: "lone_soldier",
        patterns: &["no contact with parents", "estranged", "cut off from family", "left home"],
        template_ids: &["lone-soldier-hame"],
        note: "Parents in the country but no supporting contact indicates lacking family backing",
    },
    RuleEntry {
        category: "housing",
        patterns: &["rent", "landlord", "apartment", "lease"],
        template_ids: &["rent-participation"],
        note: "A lone soldier paying rent should be offered rent participation",
    },
    // Economic distress
    RuleEntry {
        category: "economic",
        patterns: &["parents in debt", "family debt", "overdraft", "low income", "no food at home"],
        template_ids: &["tashmash-parents"],
        note: "Parental economic hardship routes to family support payments",
    },
    RuleEntry {
        category: "economic",
        patterns: &["foreclosure", "repossession", "electricity cut", "eviction", "urgent debt"],
        template_ids: &["bzack-grant"],
        note: "Acute, immediate distress qualifies for the emergency grant",
    },
    RuleEntry {
        category: "economic",
        patterns: &["wants to work", "work permit", "part-time job", "help support the family"],
        template_ids: &["work-permit"],
        note: "A soldier asking to work to support the household needs a work permit",
    },
    // Family status
    RuleEntry {
        category: "family",
        patterns: &["married", "wife", "husband", "spouse"],
        template_ids: &["tashmash-married"],
        note: "A married soldier living with a spouse routes to the married track",
    },
    RuleEntry {
        category: "family",
        patterns: &["pregnant", "pregnancy", "expecting a baby"],
        template_ids: &["tashmash-pregnancy"],
        note: "Pregnancy from week 14 routes to the pregnancy track",
    },
];

impl RuleIndex {
    /// The built-in rule table.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_RULES.to_vec(),
        }
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Evaluate the table against a narrative. Returns template ids in table
    /// order, deduplicated. Purely lexical; no model involved.
    pub fn deterministic_match(&self, narrative: &str) -> Vec<&'static str> {
        let text = narrative.to_lowercase();
        let mut ids: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            if entry.patterns.iter().any(|p| text.contains(p)) {
                for &id in entry.template_ids {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }

    /// Render the table as numbered decision rules for the consult prompt.
    pub fn render_for_prompt(&self) -> String {
        let mut out = String::new();
        let mut current_category = "";
        let mut n = 0;
        for entry in &self.entries {
            if entry.category != current_category {
                current_category = entry.category;
                out.push_str(&format!("[{}]\n", current_category));
            }
            n += 1;
            out.push_str(&format!(
                "{}. IF the narrative mentions {} THEN recommend {}  ({})\n",
                n,
                entry
                    .patterns
                    .iter()
                    .map(|p| format!("\"{}\"", p))
                    .collect::<Vec<_>>()
                    .join(" or "),
                entry.template_ids.join(" + "),
                entry.note,
            ));
        }
        out
    }
}

impl Default for RuleIndex {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lone_soldier_rules() {
        let rules = RuleIndex::builtin();
        assert_eq!(
            rules.deterministic_match("His parents abroad, he came alone"),
            vec!["lone-soldier-muvhak"]
        );
        assert_eq!(
            rules.deterministic_match("no contact with parents for two years"),
            vec!["lone-soldier-hame"]
        );
    }

    #[test]
    fn test_economic_rules_combine() {
        let rules = RuleIndex::builtin();
        let ids = rules.deterministic_match(
            "the family is in overdraft and there was an electricity cut last week",
        );
        assert_eq!(ids, vec!["tashmash-parents", "bzack-grant"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let rules = RuleIndex::builtin();
        assert!(rules.deterministic_match("wants a new beret").is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_position() {
        let rules = RuleIndex::builtin();
        // "rent" appears in one rule only, "married" in another; order follows
        // the table, not the narrative.
        let ids = rules.deterministic_match("married and paying rent");
        assert_eq!(ids, vec!["rent-participation", "tashmash-married"]);
    }

    #[test]
    fn test_prompt_rendering_contains_rules() {
        let rules = RuleIndex::builtin();
        let text = rules.render_for_prompt();
        assert!(text.contains("[lone_soldier]"));
        assert!(text.contains("lone-soldier-muvhak"));
        assert!(text.contains("IF the narrative mentions"));
    }
}
