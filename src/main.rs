use std::process;

use clap::Parser;
use rand::RngCore;

use adsb_sim::anomaly::AnomalyKind;
use adsb_sim::cli::Args;
use adsb_sim::exporter::{
    EventExporter, JsonlExporter, MultiExporter, RemoteConfig, RemoteTemplateExporter,
};
use adsb_sim::flight::default_catalog;
use adsb_sim::geo::BoundingBox;
use adsb_sim::sim::{SimConfig, Simulation};

fn parse_anomaly_kinds(list: &str) -> Result<Vec<AnomalyKind>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AnomalyKind::parse)
        .collect()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let anomaly_kinds = match parse_anomaly_kinds(&args.anomalies) {
        Ok(kinds) => kinds,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    if args.seed.is_none() {
        log::info!("seed not given, using {seed}");
    }

    let jsonl = match JsonlExporter::new(&args.output) {
        Ok(exp) => exp,
        Err(e) => {
            eprintln!("cannot open {}: {e}", args.output.display());
            process::exit(1);
        }
    };
    let remote = RemoteTemplateExporter::new(RemoteConfig {
        endpoint: args.remote_endpoint,
        api_key: args.remote_api_key,
        index: args.remote_index,
        batch_size: args.remote_batch_size,
        verify_certs: !args.remote_skip_verify,
    });
    let exporter: Box<dyn EventExporter> =
        Box::new(MultiExporter::new(vec![Box::new(jsonl), Box::new(remote)]));

    let config = SimConfig {
        flights: args.flights,
        rate: args.rate,
        duration_sec: args.duration,
        anomaly_kinds,
        bbox: BoundingBox::EUROPE,
        catalog: default_catalog(),
        seed,
    };

    Simulation::new(config, exporter).run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_list_parses_with_whitespace_and_empties() {
        let kinds = parse_anomaly_kinds(" alt_neg, teleport ,,").unwrap();
        assert_eq!(
            kinds,
            vec![AnomalyKind::NegativeAltitude, AnomalyKind::Teleport]
        );
        assert!(parse_anomaly_kinds("").unwrap().is_empty());
        assert!(parse_anomaly_kinds("bogus").is_err());
    }
}
