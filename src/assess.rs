//! Terminal RIASEC questionnaire

use karir_core::{score, AnswerSheet, Error, Likert, Questionnaire, TypeScores, LIKERT_LEGEND};
use std::io::{BufRead, Write};

/// Ask every question until a valid 1-5 answer is given. Input that ends
/// early fails with `IncompleteAnswers` on the first unanswered question.
pub fn run<R: BufRead, W: Write>(questionnaire: &Questionnaire, input: R, out: &mut W) -> anyhow::Result<TypeScores> {
    writeln!(out, "Jawablah pertanyaan berikut dengan skala 1-5:")?;
    writeln!(out, "({})", LIKERT_LEGEND)?;

    let total = questionnaire.len();
    let mut answers = AnswerSheet::new();
    let mut lines = input.lines();

    for question in questionnaire.questions() {
        loop {
            write!(out, "\n{}/{}. {}\n> ", question.index + 1, total, question.text)?;
            out.flush()?;
            let Some(line) = lines.next() else {
                return Err(Error::IncompleteAnswers(question.index).into());
            };
            match parse_answer(&line?) {
                Some(likert) => {
                    answers.record(question.index, likert);
                    break;
                }
                None => writeln!(out, "Masukkan angka 1 sampai 5.")?,
            }
        }
    }

    Ok(score(questionnaire, &answers)?)
}

fn parse_answer(line: &str) -> Option<Likert> {
    line.trim().parse::<u8>().ok().and_then(|v| Likert::new(v).ok())
}

/// Per-type totals (and averages when the questionnaire is at hand), then the top three.
pub fn report<W: Write>(scores: &TypeScores, questionnaire: Option<&Questionnaire>, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "\nHasil Tes Anda")?;
    for entry in scores.entries() {
        match questionnaire.and_then(|q| scores.average(entry.kind, q)) {
            Some(avg) => writeln!(out, "  {:<14} {:>3}  (avg {:.2})", entry.kind.label(), entry.total, avg)?,
            None => writeln!(out, "  {:<14} {:>3}", entry.kind.label(), entry.total)?,
        }
    }
    let top3 = scores.top3()?;
    writeln!(out, "\nTop 3: {} ({})", top3.labels(), top3.code())?;
    writeln!(out, "{}", top3.describe())?;
    Ok(())
}
