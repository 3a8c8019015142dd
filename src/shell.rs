use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use crate::env::EnvLookup;
use crate::model::Binding;

/// Output syntax for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Sh,
    Fish,
    PowerShell,
    Cmd,
    /// Plain `NAME="value"` lines.
    None,
    /// The bare value with no name or quoting.
    Value,
}

impl Shell {
    /// Guess the invoking shell from `SHELL` and `COMSPEC`.
    pub fn detect(env: &dyn EnvLookup) -> Option<Self> {
        let shell = env.get_var("SHELL").unwrap_or_default();
        let candidates = [
            ("bash", Self::Bash),
            ("zsh", Self::Zsh),
            ("fish", Self::Fish),
            ("powershell", Self::PowerShell),
            ("pwsh", Self::PowerShell),
            ("sh", Self::Sh),
        ];
        if let Some((_, found)) = candidates
            .into_iter()
            .find(|(suffix, _)| shell.ends_with(suffix))
        {
            return Some(found);
        }

        let comspec = env.get_var("COMSPEC").unwrap_or_default();
        if !comspec.is_empty() {
            return Some(Self::PowerShell);
        }
        if shell.ends_with("cmd.exe") {
            return Some(Self::Cmd);
        }
        None
    }

    /// Render one binding as a statement in this shell's syntax.
    pub fn format(self, binding: &Binding) -> String {
        let name = &binding.name;
        let value = &binding.value;
        match self {
            Self::Bash | Self::Zsh | Self::Sh => format!("export {name}={}", quote(value)),
            Self::Fish => format!("set -x {name} {}", quote(value)),
            Self::Cmd => format!("set {name}={}", quote(value)),
            Self::PowerShell => format!("$env:{name}={}", quote(value)),
            Self::None => format!("{name}={}", quote(value)),
            Self::Value => value.clone(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Sh => "sh",
            Self::Fish => "fish",
            Self::PowerShell => "powershell",
            Self::Cmd => "cmd",
            Self::None => "none",
            Self::Value => "value",
        }
    }
}

impl Display for Shell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported shell `{0}`")]
pub struct UnknownShell(pub String);

impl FromStr for Shell {
    type Err = UnknownShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "sh" => Ok(Self::Sh),
            "fish" => Ok(Self::Fish),
            "powershell" => Ok(Self::PowerShell),
            "cmd" => Ok(Self::Cmd),
            "none" => Ok(Self::None),
            "value" => Ok(Self::Value),
            other => Err(UnknownShell(other.to_owned())),
        }
    }
}

/// One statement per binding, joined with `\n` and no trailing newline.
pub fn render(bindings: &[Binding], shell: Shell) -> String {
    bindings
        .iter()
        .map(|binding| shell.format(binding))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Double-quote `value`, escaping quotes, backslashes and control characters.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            ch if ch.is_control() || is_invisible(ch) => {
                let code = u32::from(ch);
                if code < 0x80 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code < 0x1_0000 {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Non-control characters that render as nothing or as blank space: format
/// characters, separators other than U+0020, private use and noncharacters.
fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{00A0}'
            | '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{1680}'
            | '\u{180E}'
            | '\u{2000}'..='\u{200F}'
            | '\u{2028}'..='\u{202F}'
            | '\u{205F}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{3000}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{FFFE}'..='\u{FFFF}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn detects_shell_from_shell_suffix() {
        for (path, expected) in [
            ("/bin/bash", Shell::Bash),
            ("/usr/bin/zsh", Shell::Zsh),
            ("/usr/local/bin/fish", Shell::Fish),
            ("/opt/powershell", Shell::PowerShell),
            ("/bin/sh", Shell::Sh),
            ("/usr/bin/dash", Shell::Sh),
            ("/usr/bin/pwsh", Shell::PowerShell),
            ("C:\\Windows\\cmd.exe", Shell::Cmd),
        ] {
            assert_eq!(Shell::detect(&env(&[("SHELL", path)])), Some(expected), "{path}");
        }
    }

    #[test]
    fn comspec_means_powershell() {
        let env = env(&[("COMSPEC", "C:\\Windows\\system32\\cmd.exe")]);
        assert_eq!(Shell::detect(&env), Some(Shell::PowerShell));
    }

    #[test]
    fn unknown_environment_is_undetected() {
        assert_eq!(Shell::detect(&env(&[])), None);
        assert_eq!(Shell::detect(&env(&[("SHELL", "/bin/tcsh5")])), None);
    }

    #[test]
    fn formats_each_shell() {
        let binding = Binding::new("KEY", "a \"b\"", 1);
        let cases = [
            (Shell::Bash, "export KEY=\"a \\\"b\\\"\""),
            (Shell::Zsh, "export KEY=\"a \\\"b\\\"\""),
            (Shell::Sh, "export KEY=\"a \\\"b\\\"\""),
            (Shell::Fish, "set -x KEY \"a \\\"b\\\"\""),
            (Shell::Cmd, "set KEY=\"a \\\"b\\\"\""),
            (Shell::PowerShell, "$env:KEY=\"a \\\"b\\\"\""),
            (Shell::None, "KEY=\"a \\\"b\\\"\""),
            (Shell::Value, "a \"b\""),
        ];
        for (shell, expected) in cases {
            assert_eq!(shell.format(&binding), expected, "{shell}");
        }
    }

    #[test]
    fn quote_escapes_control_characters() {
        assert_eq!(quote("a\nb\tc\\"), "\"a\\nb\\tc\\\\\"");
        assert_eq!(quote("\u{1b}[0m\u{7f}"), "\"\\x1b[0m\\x7f\"");
        assert_eq!(quote("\u{85}"), "\"\\u0085\"");
        assert_eq!(quote("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn quote_escapes_invisible_characters() {
        assert_eq!(quote("a\u{200B}b"), "\"a\\u200bb\"");
        assert_eq!(quote("soft\u{AD}hyphen"), "\"soft\\u00adhyphen\"");
        assert_eq!(quote("\u{FEFF}x\u{A0}y"), "\"\\ufeffx\\u00a0y\"");
        assert_eq!(quote("\u{E0041}"), "\"\\U000e0041\"");
        assert_eq!(quote("a b"), "\"a b\"");
    }

    #[test]
    fn shell_names_round_trip_through_from_str() {
        for name in ["bash", "zsh", "sh", "fish", "powershell", "cmd", "none", "value"] {
            let shell: Shell = name.parse().expect("known shell");
            assert_eq!(shell.to_string(), name);
        }
        assert_eq!(
            "tcsh".parse::<Shell>(),
            Err(UnknownShell("tcsh".to_owned()))
        );
    }

    #[test]
    fn render_joins_without_trailing_newline() {
        let bindings = vec![Binding::new("A", "1", 1), Binding::new("B", "2", 2)];
        assert_eq!(render(&bindings, Shell::Bash), "export A=\"1\"\nexport B=\"2\"");
        assert_eq!(render(&[], Shell::Bash), "");
    }
}
