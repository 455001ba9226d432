//! `debian/rules`, delegating every target to `dh`.

/// Flag passed to the upstream configure step.
pub const RELEASE_CONFIGURE_FLAG: &str = "-DCMAKE_BUILD_TYPE=Release";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesScript {
    pub configure_flags: Vec<String>,
}

impl Default for RulesScript {
    fn default() -> Self {
        Self {
            configure_flags: vec![RELEASE_CONFIGURE_FLAG.to_string()],
        }
    }
}

impl RulesScript {
    // Recipe lines must start with a tab.
    pub fn render(&self) -> String {
        let mut out = String::from("#!/usr/bin/make -f\n\n%:\n\tdh $@\n");
        if !self.configure_flags.is_empty() {
            out.push_str("\noverride_dh_auto_configure:\n\tdh_auto_configure --");
            for flag in &self.configure_flags {
                out.push(' ');
                out.push_str(flag);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_pass_release_flag() {
        assert_eq!(
            RulesScript::default().render(),
            "#!/usr/bin/make -f\n\n%:\n\tdh $@\n\noverride_dh_auto_configure:\n\tdh_auto_configure -- -DCMAKE_BUILD_TYPE=Release\n"
        );
    }

    #[test]
    fn no_flags_means_no_override() {
        let rules = RulesScript {
            configure_flags: Vec::new(),
        };
        assert!(!rules.render().contains("override_dh_auto_configure"));
    }
}
