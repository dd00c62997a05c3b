//! `bloom` - create, fill, query and merge Bloom filter files.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::info;
use thiserror::Error;

use bloomer::io::{load_filter, write_filter};
use bloomer::BloomFilter;

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Filter(#[from] bloomer::Error),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    InvalidArgument(String),
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "bloom", version, about = "Utility to work with Bloom filters")]
struct Cli {
    /// Read values interactively; a blank line ends the session.
    #[arg(short, long, global = true)]
    interactive: bool,

    /// Split each line into fields and treat every field as a value.
    #[arg(short, long, global = true)]
    split: bool,

    /// Field delimiter used with --split.
    #[arg(short, long, global = true, default_value = ",")]
    delimiter: String,

    /// Comma-separated, zero-based indices of the fields to use with --split.
    /// All fields are used when omitted.
    #[arg(short, long, global = true, value_delimiter = ',')]
    fields: Vec<usize>,

    /// With --split, print only the matching fields instead of the whole line.
    #[arg(long, global = true)]
    print_fields: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new Bloom filter, fill it from stdin and store it in PATH.
    Create {
        /// The desired capacity.
        #[arg(short, default_value_t = 10000)]
        n: u64,
        /// The desired false positive probability.
        #[arg(short, default_value_t = bloomer::DEFAULT_FALSE_POSITIVE_RATE)]
        p: f64,
        path: PathBuf,
    },
    /// Insert values read from stdin into an existing filter.
    Insert { path: PathBuf },
    /// Print the values read from stdin that are in the filter.
    Check { path: PathBuf },
    /// Merge SOURCE into TARGET and store the result in TARGET.
    Join { target: PathBuf, source: PathBuf },
    /// Print the parameters of a filter.
    Show { path: PathBuf },
    /// Replace the data attached to a filter with the contents of stdin.
    SetData { path: PathBuf },
    /// Write the data attached to a filter to stdout.
    GetData { path: PathBuf },
}

/// How input lines are turned into values.
#[derive(Debug, Clone)]
struct Options {
    interactive: bool,
    split: bool,
    delimiter: String,
    fields: Vec<usize>,
    print_fields: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interactive: false,
            split: false,
            delimiter: String::from(","),
            fields: Vec::new(),
            print_fields: false,
        }
    }
}

impl Options {
    /// Return the values carried by a line.
    fn values<'a>(&self, line: &'a [u8]) -> Vec<&'a [u8]> {
        if !self.split {
            return vec![line];
        }
        let fields = split_fields(line, self.delimiter.as_bytes());
        if self.fields.is_empty() {
            return fields;
        }
        self.fields
            .iter()
            .filter_map(|i| fields.get(*i).copied())
            .collect()
    }

    /// Whether reading should stop at this line.
    fn is_end(&self, line: &[u8]) -> bool {
        self.interactive && line.is_empty()
    }
}

/// Split `line` on every occurrence of `delimiter`.
fn split_fields<'a>(line: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    if delimiter.is_empty() {
        return vec![line];
    }
    let mut fields = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i + delimiter.len() <= line.len() {
        if &line[i..i + delimiter.len()] == delimiter {
            fields.push(&line[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Read the next line into `buf`, without its `\n` or `\r\n` terminator.
/// Returns `false` at the end of input. Lines are arbitrary bytes.
fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = Options {
        interactive: cli.interactive,
        split: cli.split,
        delimiter: cli.delimiter,
        fields: cli.fields,
        print_fields: cli.print_fields,
    };
    if opts.delimiter.is_empty() {
        return Err(CliError::InvalidArgument(
            "delimiter cannot be empty.".to_owned(),
        ));
    }

    match cli.command {
        Command::Create { n, p, path } => {
            if n == 0 {
                return Err(CliError::InvalidArgument(
                    "n must be greater than 0.".to_owned(),
                ));
            }
            if !(p > 0. && p < 1.) {
                return Err(CliError::InvalidArgument(
                    "p must be between 0 and 1.".to_owned(),
                ));
            }
            let mut filter = BloomFilter::new(n, p);
            fill_from_stdin(&mut filter, &opts)?;
            write_filter(&filter, &path)?;
        }
        Command::Insert { path } => {
            let mut filter = load_filter(&path)?;
            fill_from_stdin(&mut filter, &opts)?;
            write_filter(&filter, &path)?;
        }
        Command::Check { path } => {
            let filter = load_filter(&path)?;
            if opts.interactive {
                println!("Interactive mode: Enter a blank line [by pressing ENTER] to exit.");
            }
            let stdin = io::stdin();
            let stdout = io::stdout();
            check_values(&filter, &opts, stdin.lock(), stdout.lock())?;
        }
        Command::Join { target, source } => {
            let mut filter = load_filter(&target)?;
            let other = load_filter(&source)?;
            filter.join(&other)?;
            write_filter(&filter, &target)?;
            info!(
                "joined {} into {}: {} elements",
                source.display(),
                target.display(),
                filter.count()
            );
        }
        Command::Show { path } => {
            let filter = load_filter(&path)?;
            show(&filter, &path, io::stdout().lock())?;
        }
        Command::SetData { path } => {
            let mut filter = load_filter(&path)?;
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            filter.set_data(data);
            write_filter(&filter, &path)?;
        }
        Command::GetData { path } => {
            let filter = load_filter(&path)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(filter.data())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn fill_from_stdin(filter: &mut BloomFilter, opts: &Options) -> Result<()> {
    let stdin = io::stdin();
    // Nothing is piped in and no one is going to type.
    if !opts.interactive && stdin.is_terminal() {
        return Ok(());
    }
    if opts.interactive {
        println!(
            "Interactive mode: Enter a blank line [by pressing ENTER] to exit \
             (values will not be stored otherwise)."
        );
    }
    let inserted = insert_values(filter, opts, stdin.lock())?;
    info!("inserted {} new values", inserted);

    Ok(())
}

/// Insert every value read from `input`. Returns how many insertions
/// incremented the element count.
fn insert_values<R: BufRead>(
    filter: &mut BloomFilter,
    opts: &Options,
    mut input: R,
) -> Result<u64> {
    let mut inserted = 0;
    let mut line = Vec::new();

    while read_line(&mut input, &mut line)? {
        if opts.is_end(&line) {
            break;
        }
        for value in opts.values(&line) {
            if filter.insert(value) {
                inserted += 1;
            }
        }
    }
    Ok(inserted)
}

/// Echo the lines read from `input` that match the filter.
fn check_values<R: BufRead, W: Write>(
    filter: &BloomFilter,
    opts: &Options,
    mut input: R,
    mut output: W,
) -> Result<()> {
    // In interactive mode a `>` tells matches apart from the typed input.
    let prefix: &[u8] = if opts.interactive { b">" } else { b"" };
    let mut line = Vec::new();

    while read_line(&mut input, &mut line)? {
        if opts.is_end(&line) {
            break;
        }
        let matches: Vec<&[u8]> = opts
            .values(&line)
            .into_iter()
            .filter(|v| filter.contains(v))
            .collect();
        if matches.is_empty() {
            continue;
        }
        output.write_all(prefix)?;
        if opts.split && opts.print_fields {
            output.write_all(&matches.join(opts.delimiter.as_bytes()))?;
        } else {
            output.write_all(&line)?;
        }
        output.write_all(b"\n")?;
    }
    output.flush()?;

    Ok(())
}

fn show<W: Write>(filter: &BloomFilter, path: &Path, mut output: W) -> Result<()> {
    writeln!(output, "File:                      {}", path.display())?;
    writeln!(output, "Capacity (n):              {}", filter.capacity())?;
    writeln!(output, "False positive rate (p):   {}", filter.false_positive_rate())?;
    writeln!(output, "Hashes (k):                {}", filter.hashes())?;
    writeln!(output, "Bits (m):                  {}", filter.bits())?;
    writeln!(output, "Words (M):                 {}", filter.words())?;
    writeln!(output, "Elements (N, approximate): {}", filter.count())?;
    writeln!(
        output,
        "Current false positive rate: {:.6}",
        filter.current_false_positive_rate()
    )?;
    writeln!(output, "Attached data:             {} bytes", filter.data().len())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(fields: &[usize]) -> Options {
        Options {
            split: true,
            fields: fields.to_vec(),
            ..Options::default()
        }
    }

    fn check(filter: &BloomFilter, opts: &Options, input: &str) -> String {
        let mut out = Vec::new();
        check_values(filter, opts, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_values() {
        let opts = Options::default();
        assert_eq!(opts.values(b"a,b,c"), vec![&b"a,b,c"[..]]);

        assert_eq!(split(&[]).values(b"a,b,c"), vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
        assert_eq!(split(&[2, 0, 9]).values(b"a,b,c"), vec![&b"c"[..], &b"a"[..]]);
        assert_eq!(split(&[]).values(b",a,"), vec![&b""[..], &b"a"[..], &b""[..]]);

        let opts = Options {
            delimiter: String::from("\t"),
            ..split(&[1])
        };
        assert_eq!(opts.values(b"a\tb,c"), vec![&b"b,c"[..]]);

        let opts = Options {
            delimiter: String::from("::"),
            ..split(&[])
        };
        assert_eq!(opts.values(b"a::b:c::"), vec![&b"a"[..], &b"b:c"[..], &b""[..]]);
    }

    #[test]
    fn test_binary_lines() {
        let mut filter = BloomFilter::new(1000, 0.001);
        let opts = Options::default();

        let inserted =
            insert_values(&mut filter, &opts, &b"ok\n\xff\xfe-binary\nafter\n"[..]).unwrap();
        assert_eq!(inserted, 3);
        assert!(filter.contains("ok"));
        assert!(filter.contains(b"\xff\xfe-binary"));
        assert!(filter.contains("after"));

        let mut out = Vec::new();
        check_values(&filter, &opts, &b"\xff\xfe-binary\nmissing\n"[..], &mut out).unwrap();
        assert_eq!(out, b"\xff\xfe-binary\n");
    }

    #[test]
    fn test_crlf_and_unterminated_lines() {
        let mut filter = BloomFilter::new(1000, 0.001);

        insert_values(&mut filter, &Options::default(), &b"foo\r\nbar"[..]).unwrap();
        assert!(filter.contains("foo"));
        assert!(filter.contains("bar"));
        assert!(!filter.contains("foo\r"));
    }

    #[test]
    fn test_insert_and_check() {
        let mut filter = BloomFilter::new(1000, 0.001);
        let opts = Options::default();

        let inserted = insert_values(&mut filter, &opts, "foo\nbar\nfoo\n".as_bytes()).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(filter.count(), 2);

        let out = check(&filter, &opts, "foo\nbaz\nbar\n");
        assert_eq!(out, "foo\nbar\n");
    }

    #[test]
    fn test_interactive_stops_at_blank_line() {
        let mut filter = BloomFilter::new(1000, 0.001);
        let opts = Options {
            interactive: true,
            ..Options::default()
        };

        insert_values(&mut filter, &opts, "foo\n\nbar\n".as_bytes()).unwrap();
        assert!(filter.contains("foo"));
        assert!(!filter.contains("bar"));

        let out = check(&filter, &opts, "foo\n\nfoo\n");
        assert_eq!(out, ">foo\n");
    }

    #[test]
    fn test_blank_lines_are_values_when_piped() {
        let mut filter = BloomFilter::new(1000, 0.001);

        insert_values(&mut filter, &Options::default(), "\nfoo\n".as_bytes()).unwrap();
        assert!(filter.contains(""));
        assert!(filter.contains("foo"));
    }

    #[test]
    fn test_split_check() {
        let mut filter = BloomFilter::new(1000, 0.001);
        insert_values(&mut filter, &split(&[1]), "x,10.0.0.1\ny,10.0.0.2\n".as_bytes()).unwrap();
        assert!(filter.contains("10.0.0.1"));
        assert!(!filter.contains("x"));

        let out = check(&filter, &split(&[]), "a,10.0.0.2,b\nc,d\n");
        assert_eq!(out, "a,10.0.0.2,b\n");

        let opts = Options {
            print_fields: true,
            ..split(&[])
        };
        let out = check(&filter, &opts, "a,10.0.0.2,10.0.0.1\n");
        assert_eq!(out, "10.0.0.2,10.0.0.1\n");
    }

    #[test]
    fn test_show() {
        let mut filter = BloomFilter::new(10000, 0.001);
        filter.set_data("abc");

        let mut out = Vec::new();
        show(&filter, Path::new("x.bloom"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Bits (m):                  143775"));
        assert!(out.contains("Hashes (k):                10"));
        assert!(out.contains("Attached data:             3 bytes"));
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "bloom", "--split", "-f", "0,2", "create", "-n", "500", "-p", "0.001", "out.bloom",
        ]);
        assert!(cli.split);
        assert_eq!(cli.fields, vec![0, 2]);
        match cli.command {
            Command::Create { n, p, path } => {
                assert_eq!(n, 500);
                assert_eq!(p, 0.001);
                assert_eq!(path, PathBuf::from("out.bloom"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_bad_rate() {
        let cli = Cli::parse_from(["bloom", "create", "-p", "1.5", "out.bloom"]);
        match run(cli) {
            Err(CliError::InvalidArgument(msg)) => assert!(msg.contains("p must be")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
