use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::encoding::{NUM_FEATURES, NUM_VARIANTS};

use super::simd::clipped_dot;
use super::{Accumulator, HIDDEN_SIZE, QA, QB, SCALE};

const MAGIC: u32 = 0x4555_4e4e; // "NNUE", little-endian
const FORMAT_VERSION: u32 = 1;

/// The quantised network: a feature-major first-layer weight matrix shared
/// by all variants, and one small output layer per variant.
///
/// Weights are i16 end to end; activations clip to [0, QA] before the
/// output dot product and the result is rescaled to centipawns.
#[derive(Debug)]
pub struct Network {
    /// `[NUM_FEATURES][HIDDEN_SIZE]`, row per feature.
    accumulator_weights: Box<[i16]>,
    /// `[HIDDEN_SIZE]`.
    accumulator_biases: Box<[i16]>,
    /// `[NUM_VARIANTS][2 * HIDDEN_SIZE]`: own half then opponent half.
    output_weights: Box<[i16]>,
    /// `[NUM_VARIANTS]`, in `QA * QB` units.
    output_biases: Box<[i32]>,
}

impl Network {
    pub fn from_parts(
        accumulator_weights: Vec<i16>,
        accumulator_biases: Vec<i16>,
        output_weights: Vec<i16>,
        output_biases: Vec<i32>,
    ) -> Self {
        assert_eq!(accumulator_weights.len(), NUM_FEATURES * HIDDEN_SIZE);
        assert_eq!(accumulator_biases.len(), HIDDEN_SIZE);
        assert_eq!(output_weights.len(), NUM_VARIANTS * 2 * HIDDEN_SIZE);
        assert_eq!(output_biases.len(), NUM_VARIANTS);
        Self {
            accumulator_weights: accumulator_weights.into_boxed_slice(),
            accumulator_biases: accumulator_biases.into_boxed_slice(),
            output_weights: output_weights.into_boxed_slice(),
            output_biases: output_biases.into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn accumulator_weights(&self) -> &[i16] {
        &self.accumulator_weights
    }

    #[inline(always)]
    pub fn accumulator_biases(&self) -> &[i16] {
        &self.accumulator_biases
    }

    /// Final forward pass over two resolved accumulators.
    pub fn run(&self, own: &Accumulator, their: &Accumulator, variant: u32) -> i32 {
        debug_assert!((variant as usize) < NUM_VARIANTS);
        let base = variant as usize * 2 * HIDDEN_SIZE;
        let own_weights = &self.output_weights[base..base + HIDDEN_SIZE];
        let their_weights = &self.output_weights[base + HIDDEN_SIZE..base + 2 * HIDDEN_SIZE];

        let mut sum = i64::from(self.output_biases[variant as usize]);
        sum += i64::from(clipped_dot(own.values(), own_weights, QA as i16));
        sum += i64::from(clipped_dot(their.values(), their_weights, QA as i16));

        (sum * i64::from(SCALE) / i64::from(QA * QB)) as i32
    }

    /// Stateless form: refresh both perspectives from scratch, then run.
    pub fn run_features(&self, own: &[u16], their: &[u16], variant: u32) -> i32 {
        let mut own_accum = Accumulator::zeroed();
        let mut their_accum = Accumulator::zeroed();
        own_accum.refresh(&self.accumulator_weights, &self.accumulator_biases, own);
        their_accum.refresh(&self.accumulator_weights, &self.accumulator_biases, their);
        self.run(&own_accum, &their_accum, variant)
    }

    /// Read a network from the little-endian blob format.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        if read_u32(reader)? != MAGIC {
            return Err(invalid_data("bad network magic"));
        }
        if read_u32(reader)? != FORMAT_VERSION {
            return Err(invalid_data("unsupported network format version"));
        }
        if read_u32(reader)? as usize != NUM_FEATURES
            || read_u32(reader)? as usize != HIDDEN_SIZE
            || read_u32(reader)? as usize != NUM_VARIANTS
        {
            return Err(invalid_data("network dimensions do not match this build"));
        }

        let accumulator_weights = read_i16_plane(reader, NUM_FEATURES * HIDDEN_SIZE)?;
        let accumulator_biases = read_i16_plane(reader, HIDDEN_SIZE)?;
        let output_weights = read_i16_plane(reader, NUM_VARIANTS * 2 * HIDDEN_SIZE)?;
        let output_biases = read_i32_plane(reader, NUM_VARIANTS)?;

        Ok(Self {
            accumulator_weights,
            accumulator_biases,
            output_weights,
            output_biases,
        })
    }

    /// Write the network in the matching blob format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&(NUM_FEATURES as u32).to_le_bytes())?;
        writer.write_all(&(HIDDEN_SIZE as u32).to_le_bytes())?;
        writer.write_all(&(NUM_VARIANTS as u32).to_le_bytes())?;

        write_i16_plane(writer, &self.accumulator_weights)?;
        write_i16_plane(writer, &self.accumulator_biases)?;
        write_i16_plane(writer, &self.output_weights)?;
        for &value in self.output_biases.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }
}

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i16_plane<R: Read>(reader: &mut R, len: usize) -> io::Result<Box<[i16]>> {
    let mut bytes = vec![0u8; len * 2];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

fn read_i32_plane<R: Read>(reader: &mut R, len: usize) -> io::Result<Box<[i32]>> {
    let mut bytes = vec![0u8; len * 4];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn write_i16_plane<W: Write>(writer: &mut W, values: &[i16]) -> io::Result<()> {
    for &value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}
