use std::io::{BufRead, ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;

/// What to translate, as answered in the interactive menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuMode {
    SingleFile(PathBuf),
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuChoices {
    pub target: TargetLanguage,
    pub rewrite_directive: bool,
    pub mode: MenuMode,
}

/// Print the language table, one `key. identifier` per line.
pub fn write_language_menu<W: Write>(writer: &mut W) -> Result<()> {
    for lang in TargetLanguage::ALL {
        writeln!(writer, "{}. {}", lang.menu_key(), lang.identifier())?;
    }
    Ok(())
}

/// Ask for language, directive rewrite, mode and (in single-file mode) the input file.
///
/// Unknown language keys fall back to `default_language`; only `y`/`Y` enables the
/// directive rewrite; any mode other than `2` means single-file.
pub fn run_menu<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    default_language: TargetLanguage,
) -> Result<MenuChoices> {
    writeln!(writer, "Ren'Py script translator")?;
    writeln!(writer)?;
    writeln!(writer, "Choose the target language:")?;
    write_language_menu(writer)?;

    let answer = ask(reader, writer, "Language number: ")?;
    let target = TargetLanguage::from_menu_key(&answer).unwrap_or(default_language);

    let answer = ask(reader, writer, "Replace 'translate english' with the target language? (y/n): ")?;
    let rewrite_directive = answer.eq_ignore_ascii_case("y");

    writeln!(writer)?;
    writeln!(writer, "Choose the translation mode:")?;
    writeln!(writer, "1. Translate one file")?;
    writeln!(writer, "2. Translate all .rpy files")?;
    let answer = ask(reader, writer, "Mode number: ")?;

    let mode = if answer == "2" {
        MenuMode::Batch
    } else {
        let file = ask(reader, writer, "Input file name (e.g. script.rpy): ")?;
        MenuMode::SingleFile(PathBuf::from(file))
    };

    Ok(MenuChoices {
        target,
        rewrite_directive,
        mode,
    })
}

fn ask<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> Result<String> {
    write!(writer, "{}", question)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(RpyError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "input closed before the menu was answered",
        )));
    }
    Ok(line.trim().to_string())
}
