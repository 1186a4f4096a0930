use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use cozy_chess::{Board, Color};
use rand::Rng;

use evaluation::scores::MATE_VALUE;
use evaluation::wdl::{eval_to_expected_game_score, eval_to_win_probability};
use nnue::encoding::king_side_and_bucket;
use utils::flip_eval_perspective;

use crate::entry::{PositionEntry, Wdl, ENTRY_SIZE};

/// Moves below this are considered opening noise and thinned out.
const EARLY_MOVE_CUTOFF: u16 = 10;

/// Ceiling on the label-disagreement rejection probability.
const MAX_WDL_SKIP: f64 = 0.25;

enum Sampled {
    Accepted(PositionEntry, Board),
    Rejected,
    Exhausted,
}

/// One input stream: an exclusively owned file handle, a manual cursor, and
/// the stream's own skipping probability.
struct InputFileContext {
    file: File,
    path: PathBuf,
    position: u64,
    skip_probability: f64,
}

impl InputFileContext {
    fn read_entry(&mut self) -> Option<PositionEntry> {
        let mut bytes = [0u8; ENTRY_SIZE];
        match self.file.read_exact(&mut bytes) {
            Ok(()) => {
                self.position += ENTRY_SIZE as u64;
                Some(PositionEntry::from_bytes(&bytes))
            }
            Err(_) => None,
        }
    }

    /// Read the next entry, rewinding to the file start once on end of
    /// file. Streams are expected to run forever; a failure at offset zero
    /// means the stream is truly unusable.
    fn next_entry(&mut self) -> Option<PositionEntry> {
        if let Some(entry) = self.read_entry() {
            return Some(entry);
        }
        if self.position == 0 {
            return None;
        }
        log::debug!("rewinding training stream {}", self.path.display());
        self.file.seek(SeekFrom::Start(0)).ok()?;
        self.position = 0;
        self.read_entry()
    }

    /// Read one entry and run it through the rejection chain.
    fn sample<R: Rng>(&mut self, rng: &mut R, king_bucket: Option<u32>) -> Sampled {
        let entry = match self.next_entry() {
            Some(entry) => entry,
            None => return Sampled::Exhausted,
        };

        // Mate-bound scores carry no gradient signal.
        if entry.score >= MATE_VALUE || entry.score <= -MATE_VALUE {
            return Sampled::Rejected;
        }

        // Per-stream jitter, so parallel streams drift apart over time.
        if coin(rng, self.skip_probability) {
            return Sampled::Rejected;
        }

        let wdl = entry
            .wdl_score()
            .expect("corrupt training entry: unknown WDL label");

        // Long shuffling draws are overrepresented; thin them by half-move count.
        if wdl == Wdl::Draw && coin(rng, f64::from(entry.half_move_count) / 200.0) {
            return Sampled::Rejected;
        }

        // Thin out the opening.
        if entry.move_count < EARLY_MOVE_CUTOFF {
            let skip = 0.5 * f64::from(EARLY_MOVE_CUTOFF - entry.move_count - 1)
                / f64::from(EARLY_MOVE_CUTOFF);
            if coin(rng, skip) {
                return Sampled::Rejected;
            }
        }

        // Shape the piece-count distribution.
        let num_pieces = entry.num_pieces();
        if num_pieces <= 3 {
            return Sampled::Rejected;
        }
        if num_pieces <= 4 && coin(rng, 0.9) {
            return Sampled::Rejected;
        }
        let crowd = (num_pieces as f64 - 26.0) / 25.0;
        if coin(rng, crowd * crowd) {
            return Sampled::Rejected;
        }

        // From here on the filters need the real position. The packing is a
        // strict binary contract, so failure to decode is fatal.
        let board = entry
            .unpack_board()
            .expect("corrupt training entry: invalid packed position");

        match king_bucket {
            Some(bucket) => {
                let (_, white_bucket) = king_side_and_bucket(board.king(Color::White));
                let (_, black_bucket) = king_side_and_bucket(board.king(Color::Black).flip_rank());
                if white_bucket != bucket && black_bucket != bucket {
                    return Sampled::Rejected;
                }
            }
            None => {
                // Prefer kings that have advanced up the board.
                let white_king_prob = 1.0 - board.king(Color::White).rank() as usize as f64 / 7.0;
                let black_king_prob = board.king(Color::Black).rank() as usize as f64 / 7.0;
                let skip = 0.25 * white_king_prob.min(black_king_prob).powi(2);
                if coin(rng, skip) {
                    return Sampled::Rejected;
                }
            }
        }

        // Down-weight positions whose game result disagrees with the score:
        // a high eval in a game that was eventually lost is mostly noise.
        {
            let ply = 2 * u32::from(entry.move_count);
            let pawns = f32::from(entry.score) / 100.0;
            let win = eval_to_win_probability(pawns, ply);
            let loss = eval_to_win_probability(-pawns, ply);
            let draw = 1.0 - win - loss;

            let label_probability = match wdl {
                Wdl::WhiteWins => win,
                Wdl::Draw => draw,
                Wdl::BlackWins => loss,
            };

            if coin(rng, MAX_WDL_SKIP * (1.0 - f64::from(label_probability))) {
                return Sampled::Rejected;
            }
        }

        // Skip positions the static evaluator already scores correctly and
        // extremely; they teach the network nothing new.
        {
            let static_eval = flip_eval_perspective(&board, evaluation::evaluate_board(&board));
            let eval_score = f64::from(eval_to_expected_game_score(f32::from(static_eval) / 100.0));
            let search_score = f64::from(eval_to_expected_game_score(f32::from(entry.score) / 100.0));

            let skip = 4.0
                * (search_score - 0.5).powi(2)
                * (1.0 - 6.0 * (eval_score - search_score).abs()).max(0.0);
            if coin(rng, skip) {
                return Sampled::Rejected;
            }
        }

        Sampled::Accepted(entry, board)
    }
}

/// Streams weighted, filtered training positions from a directory of
/// fixed-size record files.
pub struct TrainingDataLoader {
    contexts: Vec<InputFileContext>,
    cdf: Vec<f64>,
}

impl TrainingDataLoader {
    /// Scan `dir` and admit every regular file holding at least one full
    /// record. Each admitted stream starts at a random record boundary and
    /// gets its own skipping probability, another layer of shuffling when
    /// several loaders run in parallel.
    pub fn new<R: Rng>(rng: &mut R, dir: &Path) -> io::Result<Self> {
        let mut contexts = Vec::new();
        let mut cdf = vec![0.0];
        let mut total_bytes = 0u64;

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        paths.sort();

        for path in paths {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    log::warn!("failed to stat {}: {}", path.display(), err);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let size = metadata.len();
            if size <= ENTRY_SIZE as u64 {
                log::warn!("skipping undersized training file {}", path.display());
                continue;
            }

            let mut file = match File::open(&path) {
                Ok(file) => file,
                Err(err) => {
                    log::warn!("failed to open training file {}: {}", path.display(), err);
                    continue;
                }
            };

            // Start somewhere random so restarts do not replay the same prefix.
            let num_entries = size / ENTRY_SIZE as u64;
            let start = rng.gen_range(0..num_entries) * ENTRY_SIZE as u64;
            file.seek(SeekFrom::Start(start))?;

            total_bytes += size;
            cdf.push(total_bytes as f64);
            log::info!(
                "using training file {} ({} entries)",
                path.display(),
                num_entries
            );

            contexts.push(InputFileContext {
                file,
                path,
                position: start,
                skip_probability: rng.gen_range(0.0..0.1),
            });
        }

        if contexts.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no usable training files in {}", dir.display()),
            ));
        }

        for value in &mut cdf {
            *value /= total_bytes as f64;
        }

        Ok(Self { contexts, cdf })
    }

    /// Number of admitted input files.
    pub fn num_files(&self) -> usize {
        self.contexts.len()
    }

    /// Cumulative size distribution over admitted files, normalised to end at 1.
    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    /// Map a uniform draw in [0, 1) to a file index, weighting by file size.
    pub fn sample_file_index(&self, u: f64) -> usize {
        let index = self.cdf.partition_point(|&c| c <= u) - 1;
        index.min(self.contexts.len() - 1)
    }

    /// Fetch the next accepted `(entry, board)` pair. Every rejection
    /// re-enters file selection, so heavy files keep their weight even
    /// under rejection. Returns `None` once a selected stream is exhausted
    /// beyond its one allowed rewind.
    pub fn fetch_next<R: Rng>(
        &mut self,
        rng: &mut R,
        king_bucket: Option<u32>,
    ) -> Option<(PositionEntry, Board)> {
        loop {
            let u: f64 = rng.gen();
            let index = self.sample_file_index(u);

            match self.contexts[index].sample(rng, king_bucket) {
                Sampled::Accepted(entry, board) => return Some((entry, board)),
                Sampled::Rejected => continue,
                Sampled::Exhausted => {
                    log::warn!(
                        "training stream {} is exhausted",
                        self.contexts[index].path.display()
                    );
                    return None;
                }
            }
        }
    }
}

/// Bernoulli draw with the probability clamped into [0, 1].
fn coin<R: Rng>(rng: &mut R, probability: f64) -> bool {
    probability > 0.0 && rng.gen_bool(probability.min(1.0))
}
