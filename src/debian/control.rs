//! `debian/control` rendering and Build-Depends handling.
//!
//! See https://www.debian.org/doc/debian-policy/ch-controlfields.html
use anyhow::{Context, Result};
use debian_packaging::control as deb822;
use std::collections::BTreeSet;

/// Build-Depends every generated package starts from.
pub const BASELINE_BUILD_DEPENDS: &[&str] = &["debhelper (>= 10)"];
pub const STANDARDS_VERSION: &str = "4.5.0";
const BUILD_DEPENDS: &str = "Build-Depends";

/// Source and binary stanzas of a single-binary source package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile {
    pub source: String,
    pub section: String,
    pub priority: String,
    pub maintainer: String,
    pub build_depends: Vec<String>,
    pub homepage: String,
    pub package: String,
    pub depends: String,
    pub synopsis: String,
}

impl ControlFile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_field(&mut out, "Source", &self.source);
        push_field(&mut out, "Section", &self.section);
        push_field(&mut out, "Priority", &self.priority);
        push_field(&mut out, "Maintainer", &self.maintainer);
        push_field(&mut out, BUILD_DEPENDS, &self.build_depends.join(", "));
        push_field(&mut out, "Standards-Version", STANDARDS_VERSION);
        push_field(&mut out, "Homepage", &self.homepage);
        out.push('\n');
        push_field(&mut out, "Package", &self.package);
        push_field(&mut out, "Architecture", "any");
        push_field(&mut out, "Depends", &self.depends);
        push_field(&mut out, "Description", &self.synopsis);
        out
    }
}

fn push_field(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(&single_line(value));
    out.push('\n');
}

/// Collapse any line breaks so a value cannot start a new field.
pub fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Baseline followed by detected packages the baseline does not already name.
pub fn merge_build_depends(baseline: &[&str], detected: &BTreeSet<String>) -> Vec<String> {
    let mut merged: Vec<String> = baseline.iter().map(|dep| dep.to_string()).collect();
    for dep in detected {
        if !merged.iter().any(|existing| package_name(existing) == dep) {
            merged.push(dep.clone());
        }
    }
    merged
}

/// Replace `Build-Depends` in the source paragraph of an existing control
/// file, keeping every other field and its position.
pub fn substitute_build_depends(control: &str, build_depends: &[String]) -> Result<String> {
    let parsed = deb822::ControlFile::parse_str(control).context("parse control file")?;
    let mut rewritten = deb822::ControlFile::default();
    for paragraph in parsed.paragraphs() {
        if !paragraph.has_field("Source") {
            rewritten.add_paragraph(paragraph.clone());
            continue;
        }
        let mut source = deb822::ControlParagraph::default();
        for field in paragraph.iter_fields() {
            if field.name().eq_ignore_ascii_case(BUILD_DEPENDS) {
                source.set_field_from_string(
                    BUILD_DEPENDS.into(),
                    build_depends.join(", ").into(),
                );
            } else {
                source.set_field(field.clone());
            }
        }
        rewritten.add_paragraph(source);
    }
    let mut out = Vec::with_capacity(control.len());
    rewritten
        .write(&mut out)
        .context("serialize control file")?;
    let text = String::from_utf8(out).context("control file is not UTF-8")?;
    Ok(format!("{}\n", text.trim_end()))
}

/// Package names listed in the source paragraph's `Build-Depends`.
///
/// Version constraints, architecture and profile qualifiers are dropped;
/// for alternatives (`a | b`) only the first is kept.
pub fn parse_build_depends(control: &str) -> Result<Vec<String>> {
    let parsed = deb822::ControlFile::parse_str(control).context("parse control file")?;
    let value = parsed
        .paragraphs()
        .find(|paragraph| paragraph.has_field("Source"))
        .and_then(|paragraph| paragraph.field_str(BUILD_DEPENDS))
        .unwrap_or_default();
    let mut packages = Vec::new();
    for entry in value.split(',') {
        let first = entry.split('|').next().unwrap_or_default();
        let name = package_name(first);
        if !name.is_empty() && !packages.iter().any(|p: &String| p == name) {
            packages.push(name.to_string());
        }
    }
    Ok(packages)
}

fn package_name(relation: &str) -> &str {
    let relation = relation.trim();
    let end = relation
        .find(|c: char| c.is_whitespace() || matches!(c, '(' | '[' | '<' | ':'))
        .unwrap_or(relation.len());
    &relation[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> ControlFile {
        ControlFile {
            source: "hello".to_string(),
            section: "utils".to_string(),
            priority: "optional".to_string(),
            maintainer: "Alice <alice@example.org>".to_string(),
            build_depends: vec!["debhelper (>= 10)".to_string(), "cmake".to_string()],
            homepage: "https://launchpad.net/~alice/+archive/ubuntu/hello".to_string(),
            package: "hello".to_string(),
            depends: "${shlibs:Depends}, ${misc:Depends}".to_string(),
            synopsis: "Greets\nInjected: yes".to_string(),
        }
    }

    #[test]
    fn renders_both_stanzas() {
        let text = control().render();
        assert_eq!(
            text,
            "Source: hello\nSection: utils\nPriority: optional\nMaintainer: Alice <alice@example.org>\nBuild-Depends: debhelper (>= 10), cmake\nStandards-Version: 4.5.0\nHomepage: https://launchpad.net/~alice/+archive/ubuntu/hello\n\nPackage: hello\nArchitecture: any\nDepends: ${shlibs:Depends}, ${misc:Depends}\nDescription: Greets Injected: yes\n"
        );
    }

    #[test]
    fn merge_keeps_baseline_first_and_skips_duplicates() {
        let detected: BTreeSet<String> = ["cmake", "debhelper", "build-essential"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            merge_build_depends(BASELINE_BUILD_DEPENDS, &detected),
            vec!["debhelper (>= 10)", "build-essential", "cmake"]
        );
    }

    #[test]
    fn substitution_replaces_folded_field() {
        let original = "Source: hello\nBuild-Depends: debhelper (>= 10),\n cmake\nStandards-Version: 4.5.0\n";
        let replaced = substitute_build_depends(
            original,
            &["debhelper (>= 10)".into(), "libcurl4-openssl-dev".into()],
        )
        .expect("substitute");
        assert_eq!(
            replaced,
            "Source: hello\nBuild-Depends: debhelper (>= 10), libcurl4-openssl-dev\nStandards-Version: 4.5.0\n"
        );
    }

    #[test]
    fn parse_strips_relations_and_qualifiers() {
        let text = "Source: x\nBuild-Depends: debhelper (>= 10), cmake [amd64],\n  libfoo-dev:native | libbar-dev, qtbase5-dev <!nocheck>\nStandards-Version: 4.5.0\n";
        assert_eq!(
            parse_build_depends(text).expect("parse"),
            vec!["debhelper", "cmake", "libfoo-dev", "qtbase5-dev"]
        );
    }

    #[test]
    fn parse_of_rendered_control_round_trips_names() {
        let text = control().render();
        assert_eq!(parse_build_depends(&text).expect("parse"), vec!["debhelper", "cmake"]);
    }

    #[test]
    fn only_the_source_paragraph_is_rewritten() {
        let text = control().render();
        let replaced = substitute_build_depends(
            &text,
            &["debhelper (>= 10)".into(), "libgtk-4-dev".into()],
        )
        .expect("substitute");
        assert!(replaced.starts_with(
            "Source: hello\nSection: utils\nPriority: optional\nMaintainer: Alice <alice@example.org>\nBuild-Depends: debhelper (>= 10), libgtk-4-dev\nStandards-Version: 4.5.0\n"
        ));
        assert!(replaced.ends_with(
            "\n\nPackage: hello\nArchitecture: any\nDepends: ${shlibs:Depends}, ${misc:Depends}\nDescription: Greets Injected: yes\n"
        ));
        assert_eq!(
            parse_build_depends(&replaced).expect("parse"),
            vec!["debhelper", "libgtk-4-dev"]
        );
    }

    #[test]
    fn binary_paragraph_build_depends_is_ignored() {
        let text = "Source: x\nBuild-Depends: cmake\n\nPackage: x\nBuild-Depends: bogus\n";
        assert_eq!(parse_build_depends(text).expect("parse"), vec!["cmake"]);
    }
}
