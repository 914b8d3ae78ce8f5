use serde::{Deserialize, Serialize};

/// The `[benchmark]` section: configuration for the benchmark runners.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Benchmark {
    /// Directory where the CSV result files are written.
    #[serde(default = "Benchmark::default_results_dir")]
    pub results_dir: String,

    /// Directory with the seeded files.
    #[serde(default = "Benchmark::default_files_dir")]
    pub files_dir: String,

    /// Directory where leeched files are saved.
    #[serde(default = "Benchmark::default_downloads_dir")]
    pub downloads_dir: String,

    /// Directory with the `.torrent` metadata files.
    #[serde(default = "Benchmark::default_torrents_dir")]
    pub torrents_dir: String,

    /// Overall deadline in seconds for one leech transfer.
    #[serde(default = "Benchmark::default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u64,

    /// Overall deadline in seconds for one seed run.
    #[serde(default = "Benchmark::default_seed_timeout_secs")]
    pub seed_timeout_secs: u64,

    /// Poll cadence of the session monitor, in milliseconds.
    #[serde(default = "Benchmark::default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long a seeder waits for the first peer before giving up, in
    /// seconds. Always capped by the overall deadline.
    #[serde(default = "Benchmark::default_seed_grace_secs")]
    pub seed_grace_secs: u64,

    /// The well-known seeder address leechers reconnect to when they lose
    /// all peers.
    #[serde(default = "Benchmark::default_seeder_address")]
    pub seeder_address: String,

    /// Ports the seeder proactively connects to when it starts serving.
    #[serde(default = "Benchmark::default_leecher_ports")]
    pub leecher_ports: Vec<u16>,

    /// The benchmarked file set. Prefix `A` files are downloaded, prefix
    /// `B` files are uploaded.
    #[serde(default = "Benchmark::default_files")]
    pub files: Vec<FileConfig>,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            results_dir: Self::default_results_dir(),
            files_dir: Self::default_files_dir(),
            downloads_dir: Self::default_downloads_dir(),
            torrents_dir: Self::default_torrents_dir(),
            transfer_timeout_secs: Self::default_transfer_timeout_secs(),
            seed_timeout_secs: Self::default_seed_timeout_secs(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            seed_grace_secs: Self::default_seed_grace_secs(),
            seeder_address: Self::default_seeder_address(),
            leecher_ports: Self::default_leecher_ports(),
            files: Self::default_files(),
        }
    }
}

impl Benchmark {
    fn default_results_dir() -> String {
        "./results".to_owned()
    }

    fn default_files_dir() -> String {
        "./files".to_owned()
    }

    fn default_downloads_dir() -> String {
        "./downloads".to_owned()
    }

    fn default_torrents_dir() -> String {
        "./torrent_files".to_owned()
    }

    fn default_transfer_timeout_secs() -> u64 {
        120
    }

    fn default_seed_timeout_secs() -> u64 {
        60
    }

    fn default_poll_interval_ms() -> u64 {
        500
    }

    fn default_seed_grace_secs() -> u64 {
        5
    }

    fn default_seeder_address() -> String {
        "127.0.0.1:6881".to_owned()
    }

    fn default_leecher_ports() -> Vec<u16> {
        vec![6882, 6883, 6884]
    }

    fn default_files() -> Vec<FileConfig> {
        [
            ("A", "10kB", 333),
            ("A", "100kB", 33),
            ("A", "1MB", 3),
            ("A", "10MB", 1),
            ("B", "10kB", 333),
            ("B", "100kB", 33),
            ("B", "1MB", 3),
            ("B", "10MB", 1),
        ]
        .into_iter()
        .map(|(prefix, size, repetitions)| FileConfig {
            prefix: prefix.to_owned(),
            size: size.to_owned(),
            repetitions,
        })
        .collect()
    }
}

/// One benchmarked file: `{prefix}_{size}`, transferred `repetitions` times.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct FileConfig {
    pub prefix: String,
    pub size: String,
    pub repetitions: u32,
}

impl FileConfig {
    /// The on-disk name of the benchmarked file, for example `A_10kB`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}_{}", self.prefix, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::Benchmark;

    #[test]
    fn the_default_file_set_should_mirror_the_benchmark_matrix() {
        let benchmark = Benchmark::default();

        assert_eq!(benchmark.files.len(), 8);
        assert_eq!(benchmark.files[0].label(), "A_10kB");
        assert_eq!(benchmark.files[7].label(), "B_10MB");
    }
}
