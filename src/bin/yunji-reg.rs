//! Writes `open_with_yunji.reg`, which registers "Open with Yunji" in the
//! Explorer context menu once imported with regedit.

use std::path::PathBuf;

use clap::Parser;

use yunji::registry::{self, RegistryEntry};

#[derive(Parser, Debug)]
#[command(name = "yunji-reg", version, about = "Generate the \"Open with Yunji\" registry file")]
struct Args {
    /// Where to write the .reg file [default: next to the executable]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Editor executable the menu entry runs [default: this executable's directory]
    #[arg(long, value_name = "PATH")]
    exe: Option<PathBuf>,

    /// Icon shown next to the menu entry [default: editor.ico next to the editor]
    #[arg(long, value_name = "PATH")]
    icon: Option<PathBuf>,

    /// Menu entry text
    #[arg(long, default_value = registry::DEFAULT_LABEL)]
    label: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let this_exe = registry::current_executable()?;
    let editor = args
        .exe
        .unwrap_or_else(|| registry::sibling(&this_exe, editor_file_name()));

    let mut entry = RegistryEntry::for_executable(editor);
    entry.label = args.label;
    if let Some(icon) = args.icon {
        entry.icon = icon;
    }

    let output = args
        .output
        .unwrap_or_else(|| registry::sibling(&this_exe, registry::OUTPUT_FILE));
    entry.write_to(&output)?;

    println!("Registry file generated: {}", output.display());
    Ok(())
}

fn editor_file_name() -> &'static str {
    if cfg!(windows) {
        "yunji.exe"
    } else {
        "yunji"
    }
}
