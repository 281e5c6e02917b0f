use crate::cli::globals::GlobalArgs;
use crate::session::RedirectDecision;
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Print `stay` or `redirect <target>` for the given console path.
/// # Errors
/// Returns an error if the session guard cannot be assembled.
pub fn execute(args: &Args) -> Result<()> {
    let guard = args.globals.session_guard()?;

    println!("{}", render(&guard.guard(&args.path)));

    Ok(())
}

#[must_use]
pub fn render(decision: &RedirectDecision) -> String {
    match decision {
        RedirectDecision::Stay => "stay".to_string(),
        RedirectDecision::Redirect(target) => format!("redirect {target}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(render(&RedirectDecision::Stay), "stay");
        assert_eq!(
            render(&RedirectDecision::Redirect("/login".to_string())),
            "redirect /login"
        );
    }
}
