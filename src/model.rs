//! Linear value function trained online by SGD or TD(lambda).

use crate::records::RecordLengthError;
use crate::search::eval::terminal_score;
use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    pub learning_rate: f64,
    pub regularization: f64,
    /// Eligibility trace decay.
    pub lambda: f64,
    /// Model a bias term as coefficient 0.
    pub fit_intercept: bool,
}

impl Default for Hyperparams {
    fn default() -> Self { Self { learning_rate: 0.01, regularization: 0.005, lambda: 0.7, fit_intercept: true } }
}

/// A scored state for a TD step.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub score: f64,
    pub features: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    params: Hyperparams,
    feature_count: usize,
    coefs: Vec<f64>,
    traces: Vec<f64>,
}

const MODEL_MAGIC: &[u8; 8] = b"CKRLIN01";
const MODEL_VERSION: u32 = 1;
/// Magic, version, feature count, intercept flag, three rates, trace flag.
const HEADER_LEN: u64 = 8 + 4 + 4 + 1 + 3 * 8 + 1;

impl LinearModel {
    pub fn new(feature_count: usize, params: Hyperparams) -> Self {
        let dim = feature_count + params.fit_intercept as usize;
        Self { params, feature_count, coefs: vec![0.0; dim], traces: vec![0.0; dim] }
    }

    pub fn from_coefficients(coefs: Vec<f64>, params: Hyperparams) -> Self {
        let feature_count = coefs.len().saturating_sub(params.fit_intercept as usize);
        let traces = vec![0.0; coefs.len()];
        Self { params, feature_count, coefs, traces }
    }

    pub fn feature_count(&self) -> usize { self.feature_count }

    pub fn dimension(&self) -> usize { self.coefs.len() }

    pub fn coefficients(&self) -> &[f64] { &self.coefs }

    pub fn traces(&self) -> &[f64] { &self.traces }

    pub fn hyperparams(&self) -> Hyperparams { self.params }

    /// Changes the rates used by later updates; the model shape stays as is.
    pub fn retune(&mut self, learning_rate: f64, regularization: f64, lambda: f64) {
        self.params.learning_rate = learning_rate;
        self.params.regularization = regularization;
        self.params.lambda = lambda;
    }

    pub fn set_coefficients(&mut self, coefs: &[f64]) -> Result<(), RecordLengthError> {
        if coefs.len() != self.coefs.len() { return Err(RecordLengthError { expected: self.coefs.len(), found: coefs.len() }); }
        self.coefs.copy_from_slice(coefs);
        Ok(())
    }

    /// Start of episode.
    pub fn reset(&mut self) { self.traces.iter_mut().for_each(|t| *t = 0.0); }

    pub fn predict(&self, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), self.feature_count);
        let (bias, weights) = self.split();
        bias + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
    }

    /// Fixed outcome scores for decided positions, the linear estimate otherwise.
    pub fn evaluate(&self, x: &[f64]) -> f64 { terminal_score(x).unwrap_or_else(|| self.predict(x)) }

    /// One in-order SGD pass with L2 shrinkage. Nothing is updated unless every
    /// row fits and there is one target per row.
    pub fn partial_fit(&mut self, xs: &[Vec<f64>], ys: &[f64]) -> Result<(), RecordLengthError> {
        if xs.len() != ys.len() { return Err(RecordLengthError { expected: xs.len(), found: ys.len() }); }
        if let Some(bad) = xs.iter().find(|x| x.len() != self.feature_count) {
            return Err(RecordLengthError { expected: self.feature_count, found: bad.len() });
        }
        let lr = self.params.learning_rate;
        let reg = self.params.regularization;
        for (x, &y) in xs.iter().zip(ys) {
            let error = y - self.predict(x);
            let input = self.augment(x);
            for (c, v) in self.coefs.iter_mut().zip(&input) { *c += lr * (error * v - reg * *c); }
        }
        Ok(())
    }

    /// TD(lambda) step from `prev` to `next`. A missing `prev` marks the episode start.
    pub fn td_lambda(&mut self, prev: Option<&Transition>, next: &Transition) -> Result<(), RecordLengthError> {
        let Some(prev) = prev else { return Ok(()) };
        if prev.features.len() != self.feature_count {
            return Err(RecordLengthError { expected: self.feature_count, found: prev.features.len() });
        }
        let delta = next.score - prev.score;
        let input = self.augment(&prev.features);
        let lambda = self.params.lambda;
        let step = self.params.learning_rate * delta;
        for ((t, c), v) in self.traces.iter_mut().zip(self.coefs.iter_mut()).zip(&input) {
            *t = lambda * *t + v;
            *c += step * *t;
        }
        Ok(())
    }

    /// "Name.....: value" lines, bias first as "Constant".
    pub fn coefficient_report(&self, names: &[String]) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.coefs.len());
        let (bias, weights) = self.split();
        if self.params.fit_intercept { lines.push(format!("{:.<33}: {:>9.4}", "Constant", bias)); }
        for (i, w) in weights.iter().enumerate() {
            let name = names.get(i).map(String::as_str).unwrap_or("?");
            lines.push(format!("{:.<33}: {:>9.4}", name, w));
        }
        lines
    }

    fn split(&self) -> (f64, &[f64]) {
        if self.params.fit_intercept { (self.coefs[0], &self.coefs[1..]) } else { (0.0, &self.coefs[..]) }
    }

    fn augment(&self, x: &[f64]) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.coefs.len());
        if self.params.fit_intercept { v.push(1.0); }
        v.extend_from_slice(x);
        v
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Format (LE):
        // magic: 8 bytes b"CKRLIN01"
        // u32 version, u32 feature_count, u8 fit_intercept
        // f64 learning_rate, f64 regularization, f64 lambda
        // u8 has_trace
        // f64 coefs[dimension], f64 traces[dimension] if has_trace
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() { create_dir_all(dir).with_context(|| format!("create model dir: {}", dir.display()))?; }
        }
        let f = File::create(path).with_context(|| format!("create model file: {}", path.display()))?;
        let mut w = BufWriter::new(f);
        let has_trace = self.traces.iter().any(|&t| t != 0.0);
        w.write_all(MODEL_MAGIC)?;
        w.write_all(&MODEL_VERSION.to_le_bytes())?;
        w.write_all(&(self.feature_count as u32).to_le_bytes())?;
        w.write_all(&[self.params.fit_intercept as u8])?;
        for v in [self.params.learning_rate, self.params.regularization, self.params.lambda] { w.write_all(&v.to_le_bytes())?; }
        w.write_all(&[has_trace as u8])?;
        for c in &self.coefs { w.write_all(&c.to_le_bytes())?; }
        if has_trace { for t in &self.traces { w.write_all(&t.to_le_bytes())?; } }
        w.flush().context("flush model file")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open model file: {}", path.display()))?;
        let file_len = f.metadata().with_context(|| format!("stat model file: {}", path.display()))?.len();
        let mut r = BufReader::new(f);
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic).context("read magic")?;
        if &magic != MODEL_MAGIC { bail!("bad model magic"); }
        let version = read_u32(&mut r).context("read version")?;
        if version != MODEL_VERSION { bail!("unsupported model version {version}"); }
        let feature_count = read_u32(&mut r).context("read feature_count")? as usize;
        let fit_intercept = read_u8(&mut r).context("read fit_intercept")? != 0;
        let learning_rate = read_f64(&mut r).context("read learning_rate")?;
        let regularization = read_f64(&mut r).context("read regularization")?;
        let lambda = read_f64(&mut r).context("read lambda")?;
        let has_trace = read_u8(&mut r).context("read has_trace")? != 0;
        let params = Hyperparams { learning_rate, regularization, lambda, fit_intercept };
        // The header count must be backed by bytes in the file before anything is sized from it.
        let dim = feature_count as u64 + fit_intercept as u64;
        let needed = HEADER_LEN + dim * 8 * (1 + has_trace as u64);
        if file_len < needed { bail!("model file is {file_len} bytes, header needs {needed}"); }
        let dim = dim as usize;
        let coefs = (0..dim).map(|_| read_f64(&mut r)).collect::<std::io::Result<Vec<_>>>().context("read coefficients")?;
        let traces = if has_trace {
            (0..dim).map(|_| read_f64(&mut r)).collect::<std::io::Result<Vec<_>>>().context("read traces")?
        } else {
            vec![0.0; dim]
        };
        Ok(Self { params, feature_count, coefs, traces })
    }

    /// Loads `path`, falling back to a zero model when the file is missing,
    /// unreadable or shaped for a different feature set.
    pub fn load_or_fresh<P: AsRef<Path>>(path: P, feature_count: usize, params: Hyperparams) -> Self {
        let path = path.as_ref();
        match LinearModel::load(path) {
            Ok(m) if m.feature_count == feature_count => m,
            Ok(m) => {
                warn!("model {} has {} features, expected {}; starting fresh", path.display(), m.feature_count, feature_count);
                LinearModel::new(feature_count, params)
            }
            Err(e) => {
                warn!("could not load model {}: {:#}; starting fresh", path.display(), e);
                LinearModel::new(feature_count, params)
            }
        }
    }
}

fn read_u8<R: Read>(r: &mut R) -> std::io::Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_f64<R: Read>(r: &mut R) -> std::io::Result<f64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(f64::from_le_bytes(b))
}
