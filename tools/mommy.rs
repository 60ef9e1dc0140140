/// Mommy — prints an encouraging (or consoling) response.
///
/// Usage: mommy [options] <positive|+|0|negative|-|1>
///
/// Variable defaults come from, in increasing precedence: the responses
/// file (bundled unless `--responses-file`), each variable's `env_key`
/// environment variable (`/`-separated), and the `--mommys-*` flags
/// (`--daddys-*` when installed as `daddy`).

use clap::{Command, CommandFactory, FromArgMatches, Parser};
use mommy::{
    default_responses, Generator, Overrides, ResponseType, Responses, Spiciness, VariableKey,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Variable flags: (field id, flag suffix, help with `<>` for the role, nsfw).
/// Names and help are filled in per role by `build_command`.
const VARIABLE_FLAGS: [(&str, &str, &str, bool); 7] = [
    ("little", "little", "what to call you~", false),
    ("pronouns", "pronouns", "what pronouns <> will use for themself~", false),
    ("roles", "roles", "what role <> will have~", false),
    ("emotes", "emotes", "what emotes <> will have~", false),
    ("moods", "moods", "how kinky <> will be~ (nsfw)", true),
    ("parts", "parts", "what part of <> you should crave~ (nsfw)", true),
    ("fucking", "fucking", "what to call <>'s pet~ (nsfw)", true),
];

#[derive(Debug, Parser)]
struct Args {
    /// positive (+, 0) or negative (-, 1)
    response: ResponseType,

    /// stylize the output using ANSI escape codes
    #[arg(short, long)]
    stylize: bool,

    /// show NSFW flags and include NSFW responses
    #[arg(short, long)]
    nsfw: bool,

    /// seed for the random number generator
    #[arg(short = 'S', long)]
    seed: Option<u64>,

    /// responses file, RON or JSON (default: bundled responses)
    #[arg(short = 'f', long)]
    responses_file: Option<PathBuf>,

    #[arg(long, value_delimiter = ',')]
    little: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pronouns: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    roles: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    emotes: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    moods: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    parts: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    fucking: Vec<String>,
}

impl Args {
    /// Non-empty flag lists, keyed by the variable they replace.
    fn flag_defaults(&self) -> Vec<(VariableKey, Vec<String>)> {
        [
            (VariableKey::mood(), &self.moods),
            (VariableKey::emote(), &self.emotes),
            (VariableKey::pronoun(), &self.pronouns),
            (VariableKey::role(), &self.roles),
            (VariableKey::affectionate_term(), &self.little),
            (VariableKey::denigrating_term(), &self.fucking),
            (VariableKey::part(), &self.parts),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| (key, values.clone()))
        .collect()
    }
}

/// "daddy" when installed under that name, "mommy" otherwise.
fn role_for(argv0: &str) -> &'static str {
    match Path::new(argv0).file_stem().and_then(|s| s.to_str()) {
        Some("daddy") => "daddy",
        _ => "mommy",
    }
}

/// True if `-n`/`--nsfw` appears before any `--`.
fn wants_nsfw(args: &[String]) -> bool {
    for arg in args.iter().skip(1) {
        if arg == "--" {
            break;
        }
        if arg == "--nsfw" {
            return true;
        }
        if let Some(shorts) = arg.strip_prefix('-').filter(|s| !s.starts_with('-')) {
            for c in shorts.chars() {
                match c {
                    'n' => return true,
                    // The rest of the cluster is this flag's value.
                    'S' | 'f' => break,
                    _ => {}
                }
            }
        }
    }
    false
}

/// The command with variable flags named after `role` (`--mommys-*` or
/// `--daddys-*`, the other prefix kept as an alias). NSFW flags are
/// listed only when `nsfw` is set.
fn build_command(role: &str, nsfw: bool) -> Command {
    let other = if role == "daddy" { "mommy" } else { "daddy" };
    let mut cmd = Args::command()
        .name(role.to_string())
        .about(format!("{}'s here to support you~", role));

    for (id, suffix, help, nsfw_only) in VARIABLE_FLAGS {
        cmd = cmd.mut_arg(id, |arg| {
            arg.long(format!("{}s-{}", role, suffix))
                .alias(format!("{}s-{}", other, suffix))
                .help(help.replace("<>", role))
                .hide(nsfw_only && !nsfw)
        });
    }
    cmd
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let role = role_for(argv.first().map(String::as_str).unwrap_or("mommy"));
    let matches = build_command(role, wants_nsfw(&argv)).get_matches_from(&argv);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let seed = args.seed.unwrap_or_else(seed_from_clock);

    if let Err(e) = run(&args, seed) {
        fatal(seed, &e);
    }
}

fn run(args: &Args, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &args.responses_file {
        Some(path) => Responses::load(path)
            .map_err(|e| format!("cannot load responses file '{}': {}", path.display(), e))?,
        None => default_responses().clone(),
    };

    let env = base.env_overrides(|key| std::env::var(key).ok());
    let config = base.with_variables(env).with_variables(args.flag_defaults());

    if !args.nsfw && config.is_nsfw() {
        return Err("cannot generate NSFW content without --nsfw".into());
    }

    tracing::debug!(seed, response = %args.response, "generating");
    let mut gen = Generator::with_seed(&config, seed)?;
    let res = gen.generate(args.response, &Overrides::new())?;

    if args.stylize {
        println!("{}", stylize_response(&res));
    } else {
        println!("{}", res);
    }
    Ok(())
}

/// Print a chill consolation and the error, then exit.
fn fatal(seed: u64, err: &dyn std::fmt::Display) -> ! {
    let chill = Overrides::from([(VariableKey::mood(), Spiciness::chill().to_string())]);
    if let Ok(mut gen) = Generator::with_seed(default_responses(), seed) {
        if let Ok(res) = gen.generate(ResponseType::Negative, &chill) {
            eprintln!("{}", res);
        }
    }
    eprintln!("{}", err);
    process::exit(1);
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Wrap lines that open and close with `*` in ANSI italics. Responses
/// only ever italicise whole lines.
fn stylize_response(res: &str) -> String {
    res.split('\n')
        .map(|line| {
            if line.len() >= 2 && line.starts_with('*') && line.ends_with('*') {
                format!("\x1b[3m{}\x1b[0m", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylize_wraps_italic_lines_only() {
        assert_eq!(
            stylize_response("*pets your head*\ngood girl~"),
            "\x1b[3m*pets your head*\x1b[0m\ngood girl~"
        );
        assert_eq!(stylize_response("no *stars* here"), "no *stars* here");
        assert_eq!(stylize_response("*"), "*");
    }

    fn parse(role: &str, argv: &[&str]) -> Result<Args, clap::Error> {
        let matches = build_command(role, false).try_get_matches_from(argv)?;
        Args::from_arg_matches(&matches)
    }

    fn help(role: &str, nsfw: bool) -> String {
        build_command(role, nsfw).render_help().to_string()
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flag_lists() {
        let args = parse(
            "mommy",
            &[
                "mommy",
                "--daddys-roles",
                "daddy",
                "--mommys-little",
                "boy,kiddo",
                "-S",
                "7",
                "-",
            ],
        )
        .unwrap();
        assert_eq!(args.response, ResponseType::Negative);
        assert_eq!(args.seed, Some(7));
        let flags = args.flag_defaults();
        assert_eq!(flags.len(), 2);
        assert!(flags.contains(&(VariableKey::role(), vec!["daddy".to_string()])));
        assert!(flags.contains(&(
            VariableKey::affectionate_term(),
            vec!["boy".to_string(), "kiddo".to_string()]
        )));
    }

    #[test]
    fn nsfw_flags_listed_only_with_nsfw() {
        let plain = help("mommy", false);
        assert!(plain.contains("--mommys-little"), "{plain}");
        for flag in ["--mommys-moods", "--mommys-parts", "--mommys-fucking"] {
            assert!(!plain.contains(flag), "{flag} shown without --nsfw");
        }

        let spicy = help("mommy", true);
        for flag in ["--mommys-moods", "--mommys-parts", "--mommys-fucking"] {
            assert!(spicy.contains(flag), "{flag} missing with --nsfw");
        }
    }

    #[test]
    fn hidden_nsfw_flags_still_parse() {
        let args = parse("mommy", &["mommy", "--mommys-moods", "chill,yikes", "+"]).unwrap();
        assert_eq!(args.moods, vec!["chill", "yikes"]);
    }

    #[test]
    fn daddy_binary_names_flags_after_role() {
        assert_eq!(role_for("/usr/local/bin/daddy"), "daddy");
        assert_eq!(role_for("daddy.exe"), "daddy");
        assert_eq!(role_for("mommy"), "mommy");
        assert_eq!(role_for("cargo-mommy"), "mommy");

        let text = help("daddy", false);
        assert!(text.contains("--daddys-little"), "{text}");
        assert!(text.contains("what role daddy will have~"), "{text}");
        assert!(!text.contains("--mommys-"), "{text}");

        let args = parse("daddy", &["daddy", "--mommys-pronouns", "his", "positive"]).unwrap();
        assert_eq!(args.pronouns, vec!["his"]);
    }

    #[test]
    fn detects_nsfw_request() {
        assert!(wants_nsfw(&argv(&["mommy", "--nsfw", "+"])));
        assert!(wants_nsfw(&argv(&["mommy", "-sn", "+"])));
        assert!(wants_nsfw(&argv(&["mommy", "-n", "--help"])));
        assert!(!wants_nsfw(&argv(&["mommy", "--help"])));
        assert!(!wants_nsfw(&argv(&["mommy", "-Sn", "+"])));
        assert!(!wants_nsfw(&argv(&["mommy", "--", "-n"])));
    }

    #[test]
    fn rejects_unknown_response_type() {
        assert!(parse("mommy", &["mommy", "meh"]).is_err());
    }
}
