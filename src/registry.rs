//! Generates the `.reg` file that adds "Open with Yunji" to the Explorer
//! context menu of every file type.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

pub const DEFAULT_LABEL: &str = "Open with Yunji";
pub const ICON_FILE: &str = "editor.ico";
pub const OUTPUT_FILE: &str = "open_with_yunji.reg";

const KEY: &str = r"HKEY_CLASSES_ROOT\*\shell\Open with Yunji";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Text shown in the context menu.
    pub label: String,
    pub icon: PathBuf,
    /// Editor executable; invoked with the clicked file as its only argument.
    pub executable: PathBuf,
}

impl RegistryEntry {
    /// Entry for the editor at `executable`, with `editor.ico` beside it.
    pub fn for_executable(executable: PathBuf) -> Self {
        let icon = sibling(&executable, ICON_FILE);
        Self {
            label: DEFAULT_LABEL.to_string(),
            icon,
            executable,
        }
    }

    /// The command line stored under the `command` subkey.
    pub fn command_line(&self) -> String {
        format!("\"{}\" \"%1\"", self.executable.display())
    }

    /// The `.reg` file text, CRLF line endings.
    pub fn render(&self) -> String {
        let lines = [
            "Windows Registry Editor Version 5.00".to_string(),
            String::new(),
            format!("[{}]", KEY),
            format!("@=\"{}\"", escape(&self.label)),
            format!(
                "\"Icon\"=\"{}\"",
                escape(&format!("{},0", self.icon.display()))
            ),
            String::new(),
            format!("[{}\\command]", KEY),
            format!("@=\"{}\"", escape(&self.command_line())),
            String::new(),
        ];
        lines.join("\r\n")
    }

    /// Write the rendered text to `path` as UTF-16LE with a byte-order mark,
    /// the encoding regedit expects for non-ASCII text.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, encode_utf16le(&self.render()))
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote registry file {}", path.display());
        Ok(())
    }
}

/// Escape a value for a quoted `.reg` string.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// `name` in the directory holding `path`.
pub fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

pub fn current_executable() -> anyhow::Result<PathBuf> {
    std::env::current_exe().context("locating the editor executable")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RegistryEntry {
        RegistryEntry {
            label: DEFAULT_LABEL.to_string(),
            icon: PathBuf::from(r"C:\Apps\Yunji\editor.ico"),
            executable: PathBuf::from(r"C:\Apps\Yunji\yunji.exe"),
        }
    }

    #[test]
    fn renders_both_keys() {
        let text = entry().render();
        let expected = [
            "Windows Registry Editor Version 5.00",
            "",
            r"[HKEY_CLASSES_ROOT\*\shell\Open with Yunji]",
            r#"@="Open with Yunji""#,
            r#""Icon"="C:\\Apps\\Yunji\\editor.ico,0""#,
            "",
            r"[HKEY_CLASSES_ROOT\*\shell\Open with Yunji\command]",
            r#"@="\"C:\\Apps\\Yunji\\yunji.exe\" \"%1\"""#,
            "",
        ]
        .join("\r\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape(r#"a\b"c"#), r#"a\\b\"c"#);
        assert_eq!(escape("用 云记 打开"), "用 云记 打开");
    }

    #[test]
    fn writes_utf16_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);
        let mut entry = entry();
        entry.label = "用 云记 打开".to_string();
        entry.write_to(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let text = String::from_utf16(&units).unwrap();
        assert_eq!(text, entry.render());
        assert!(text.contains("@=\"用 云记 打开\""));
    }

    #[test]
    fn icon_defaults_next_to_the_executable() {
        let exe = Path::new("/opt/yunji/yunji");
        let entry = RegistryEntry::for_executable(exe.to_path_buf());
        assert_eq!(entry.icon, Path::new("/opt/yunji").join(ICON_FILE));
        assert_eq!(entry.label, DEFAULT_LABEL);
        assert_eq!(sibling(Path::new("yunji"), OUTPUT_FILE), Path::new(OUTPUT_FILE));
    }
}
