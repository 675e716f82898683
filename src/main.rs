use flac_bridge::audio::{scan_tag, FlacBridge, FlacStreamDecoder, Session};
use flac_bridge::config::Settings;
use flac_bridge::init_app_dirs;
use flac_bridge::metadata::cue_track;
use flac_bridge::ui::{Cli, PcmSink};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::new();
    let args = &cli.args;

    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Settings::default_path(),
    };
    let settings = Settings::load(&config_path)?;
    settings.validate()?;

    // stdout may carry PCM, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(track) = args.track_name {
        match cue_track(&args.input, track, &settings.track_extension)? {
            Some(name) => println!("{}", name),
            None => eprintln!("{:?} has no virtual track {}", args.input, track),
        }
        return Ok(());
    }

    if args.tags {
        let tag = scan_tag(&args.input)?;
        cli.display_tag(&tag);
        return Ok(());
    }

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let sink = PcmSink::new(writer)
        .with_max_frames(args.max_frames)
        .with_seek(args.seek)
        .with_progress(!args.quiet && args.output.is_some());

    let mut decoder = FlacStreamDecoder::open(&args.input, settings.verify_decoding)?;
    let session = Session::with_buffer_capacity(settings.buffer_capacity_hint);
    let mut bridge = FlacBridge::new(settings.plugin_name.clone(), session, sink);

    let outcome = match decoder.run(&mut bridge) {
        Ok(outcome) => outcome,
        Err(e) => {
            cli.display_error(&e);
            return Err(e.into());
        }
    };

    let sink = bridge.into_client();
    cli.display_summary(outcome, &sink);
    sink.finish()?;

    Ok(())
}
