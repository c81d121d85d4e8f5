//! The `gatewaymaker init` command.

use std::path::Path;

use anyhow::{Context, Result};

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    let path = Path::new(path);
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing("gatewaymaker.toml", SAMPLE_CONFIG)?;
    write_if_missing("header.tex", SAMPLE_HEADER)?;
    write_if_missing("fragments/arithmetic.tex", ARITHMETIC_FRAGMENT)?;
    write_if_missing("fragments/factoring.tex", FACTORING_FRAGMENT)?;

    println!("\nNext steps:");
    println!("  1. Add questions to the files in fragments/");
    println!("  2. Run: gatewaymaker validate");
    println!("  3. Run: gatewaymaker generate");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gatewaymaker configuration

preamble_file = "header.tex"
output_dir = "tests"
format = "latex"
parse_mode = "permissive"

# Break after every 4th question of the test.
[page_breaks]
kind = "every_questions"
interval = 4

[[question_sets]]
name = "arithmetic"
draw_count = 2

[[question_sets.files]]
path = "fragments/arithmetic.tex"
instruction = "Compute the following without a calculator."

[[question_sets]]
name = "factoring"
draw_count = 2

[[question_sets.files]]
path = "fragments/factoring.tex"
instruction = "Factor completely."
"#;

const SAMPLE_HEADER: &str = r#"\documentclass[12pt]{exam}
\usepackage{amsmath}
\begin{document}
\begin{center}
{\Large Gateway Exam, Version %%VERSION_NUMBER%%}
\end{center}
"#;

const ARITHMETIC_FRAGMENT: &str = r#"% One question per block; an answer line starts with %%
$2 + 2 = $
%% $4$

$3 \cdot 7 = $
%% $21$

$\frac{1}{2} + \frac{1}{3} = $
%% $\frac{5}{6}$
"#;

const FACTORING_FRAGMENT: &str = r#"$x^2 - 1$
%% $(x-1)(x+1)$

$x^2 + 5x + 6$
%% $(x+2)(x+3)$

$2x^2 - 8$
%% $2(x-2)(x+2)$
"#;
