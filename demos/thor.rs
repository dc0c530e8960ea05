//! Load generator for exercising spidey, most usefully in forked mode.
//!
//! Each worker issues `-r` GET requests against the URL one after another and
//! prints the time every request took, its average and the resulting
//! throughput. `-p` workers run at once.
//!
//! ```text
//! cargo run --example thor -- -p 4 -r 10 http://127.0.0.1:9898/
//! ```

use std::io::{self, Read};
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::task::JoinSet;

#[derive(Debug, Parser)]
#[command(name = "thor", about = "Hammer an HTTP server with concurrent GET requests")]
struct Args {
    /// Number of workers issuing requests at once
    #[arg(short = 'p', long = "processes", default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    processes: u64,

    /// Requests issued by each worker
    #[arg(short = 'r', long = "requests", default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    requests: u64,

    /// Print the body of the first response
    #[arg(short, long)]
    verbose: bool,

    /// URL to request
    url: String,
}

/// Fetch `url` and read the whole body. Error statuses still count as a
/// completed request.
fn get(url: &str) -> io::Result<Vec<u8>> {
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => return Err(io::Error::other(e.to_string())),
    };

    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;
    Ok(body)
}

/// Run one worker and return its average request time.
fn worker(id: u64, url: &str, requests: u64) -> io::Result<Duration> {
    let mut total = Duration::ZERO;

    for n in 0..requests {
        let start = Instant::now();
        get(url)?;
        let elapsed = start.elapsed();
        total += elapsed;
        println!("Process: {id}, Request: {n}, Elapsed Time: {:.2}", elapsed.as_secs_f64());
    }

    let average = total / requests as u32;
    println!("Process: {id}, AVERAGE   , Elapsed Time: {:.2}", average.as_secs_f64());
    println!("Throughput: {:.2} requests/s", 1.0 / average.as_secs_f64().max(f64::EPSILON));
    Ok(average)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let url = args.url.clone();
    let first = tokio::task::spawn_blocking(move || get(&url)).await??;
    if args.verbose {
        println!("{}", String::from_utf8_lossy(&first));
    }

    let mut tasks = JoinSet::new();
    for id in 0..args.processes {
        let url = args.url.clone();
        let requests = args.requests;
        tasks.spawn_blocking(move || worker(id, &url, requests));
    }

    let mut averages = Vec::with_capacity(args.processes as usize);
    while let Some(result) = tasks.join_next().await {
        averages.push(result??);
    }

    let total: Duration = averages.iter().sum();
    let overall = total / averages.len() as u32;
    println!("TOTAL AVERAGE ELAPSED TIME: {:.2}", overall.as_secs_f64());
    Ok(())
}
