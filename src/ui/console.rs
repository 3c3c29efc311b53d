use std::io::{self, BufRead, Write};

use crate::api::Gateway;
use crate::api::models::Field;
use crate::form::{FormController, ResultFlag, Status};

/// Line-based contact form: asks for each field, submits, and offers a retry
/// with the same values when delivery fails.
pub fn run<G, R, W>(form: &mut FormController<G>, input: &mut R, out: &mut W) -> io::Result<Status>
where
    G: Gateway,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Contact Me")?;
    writeln!(out, "I would love to hear from you!")?;
    for field in Field::ALL {
        let hint = if field.is_optional() { " (optional)" } else { "" };
        write!(out, "{}{hint}: ", field.label())?;
        out.flush()?;
        let Some(value) = read_line(input)? else {
            return Ok(form.status());
        };
        form.edit(field, value);
    }

    loop {
        let Some(pending) = form.submit() else {
            return Ok(form.status());
        };
        writeln!(out, "[{}]", form.button_label())?;
        let delivery = crate::utils::RUNTIME.block_on(pending.wait());
        form.resolve(delivery);
        writeln!(out, "[{}]", form.button_label())?;
        match form.result_flag() {
            ResultFlag::Success => writeln!(out, "Thanks, your message is on its way.")?,
            ResultFlag::Fail => writeln!(
                out,
                "Your message could not be delivered. Nothing you typed was lost."
            )?,
            ResultFlag::Unset => {}
        }

        if form.status() != Status::Failed {
            return Ok(form.status());
        }
        write!(out, "Try again? [y/N] ")?;
        out.flush()?;
        match read_line(input)? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
            _ => return Ok(form.status()),
        }
    }
}

/// `None` on end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
