//! Line-oriented front-end for [`CaptureForm`].
//!
//! Inside the action editor a line holding only `.` stands in for
//! Ctrl+Enter: it submits and is not added to the text.

use std::io::{self, BufRead, Write};

use super::client::LogSink;
use super::form::{CaptureForm, Field, Key, KeyOutcome};

const SUBMIT_LINE: &str = ".";
const DONE_LINE: &str = ":done";

pub async fn run<R, W, S>(
    form: &mut CaptureForm,
    sink: &S,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: LogSink + ?Sized,
{
    print_banner(form, out)?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let (command, rest) = split_command(&line);

        match command {
            "" => {}
            "help" => print_help(out)?,
            "list" => print_systems(form, out)?,
            "select" => {
                form.set_focus(Field::SystemPicker);
                match rest.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                    Some(index) => match form.select(index) {
                        Some(name) => writeln!(out, "Selected system: {name}")?,
                        None => writeln!(out, "[Warning] No system numbered {rest}")?,
                    },
                    None => writeln!(out, "[Warning] Usage: select <number>")?,
                }
            }
            "system" => {
                form.set_focus(Field::ManualSystem);
                form.set_manual_system(rest);
                if rest.is_empty() {
                    writeln!(out, "Manual system cleared")?;
                } else {
                    writeln!(out, "Manual system: {rest}")?;
                }
            }
            "action" => {
                form.set_focus(Field::Action);
                writeln!(
                    out,
                    "Describe the action. End with '{SUBMIT_LINE}' on its own line to submit, \
                     or '{DONE_LINE}' to keep it without submitting."
                )?;

                let mut text = Vec::new();
                let mut submit = false;
                for line in lines.by_ref() {
                    let line = line?;
                    match line.trim_end() {
                        SUBMIT_LINE => {
                            submit = form.handle_key(Key::CtrlEnter) == KeyOutcome::Submit;
                            break;
                        }
                        DONE_LINE => break,
                        _ => text.push(line),
                    }
                }
                form.set_action_text(text.join("\n"));

                if submit {
                    submit_and_report(form, sink, out).await?;
                }
            }
            "submit" => submit_and_report(form, sink, out).await?,
            "show" => print_state(form, out)?,
            "exit" | "quit" => break,
            other => writeln!(out, "[Warning] Unknown command: {other} (type 'help')")?,
        }
    }

    Ok(())
}

fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

async fn submit_and_report<W, S>(form: &mut CaptureForm, sink: &S, out: &mut W) -> io::Result<()>
where
    W: Write,
    S: LogSink + ?Sized,
{
    let notice = form.submit(sink).await;
    writeln!(out, "[{}] {notice}", notice.title())
}

fn print_banner<W: Write>(form: &CaptureForm, out: &mut W) -> io::Result<()> {
    writeln!(out, "Maintenance Log Entry")?;
    writeln!(out, "User: {}", form.current_user())?;
    print_systems(form, out)?;
    writeln!(out, "Type 'help' for commands.")
}

fn print_systems<W: Write>(form: &CaptureForm, out: &mut W) -> io::Result<()> {
    if form.systems().is_empty() {
        return writeln!(
            out,
            "No systems found in directory. Enter one with 'system <name>'."
        );
    }

    writeln!(out, "Systems:")?;
    for (i, name) in form.systems().iter().enumerate() {
        let marker = if name == form.selected_system() { '*' } else { ' ' };
        writeln!(out, " {marker} {:>3}. {name}", i + 1)?;
    }
    Ok(())
}

fn print_state<W: Write>(form: &CaptureForm, out: &mut W) -> io::Result<()> {
    let or_none = |s: &str| {
        if s.trim().is_empty() {
            "(none)".to_string()
        } else {
            s.to_string()
        }
    };

    writeln!(out, "User:            {}", form.current_user())?;
    writeln!(out, "Selected system: {}", form.selected_system())?;
    writeln!(out, "Manual system:   {}", or_none(form.manual_system()))?;
    writeln!(out, "Will log as:     {}", or_none(form.effective_system()))?;
    let flag = if form.action_flagged() { " [required]" } else { "" };
    writeln!(out, "Action{flag}:")?;
    for line in or_none(form.action_text()).lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  list            show systems from the directory")?;
    writeln!(out, "  select <n>      pick system number n")?;
    writeln!(out, "  system [name]   type a system name (overrides the pick; blank clears)")?;
    writeln!(out, "  action          write the action text")?;
    writeln!(out, "  submit          send the log entry")?;
    writeln!(out, "  show            show the current entry")?;
    writeln!(out, "  exit            quit")
}
