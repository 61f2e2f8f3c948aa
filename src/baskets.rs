//! Basket sources: restartable, bounded sequences of baskets.
//!
//! A dataset is a text stream with one basket per line and whitespace
//! separated item ids. Every mining pass starts with [`BasketSource::reset`]
//! and reads at most `limit` baskets, so two passes over the same source
//! always see the same baskets in the same order.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::{MiningError, Result};
use crate::types::{Basket, ItemId};

const APPROX_NUM_ITEMS_IN_1_BASKET: usize = 16; // arbitrary

pub trait BasketSource {
    /// Read the next basket into `basket`, replacing its contents.
    /// Returns `false` once the data is exhausted.
    fn read_basket(&mut self, basket: &mut Basket) -> Result<bool>;

    /// Restart iteration at the first basket.
    fn reset(&mut self) -> Result<()>;
}

/// Parse one dataset line. `index` is only used for error reporting.
pub fn parse_basket(line: &str, index: usize, basket: &mut Basket) -> Result<()> {
    basket.clear();
    for token in line.split_ascii_whitespace() {
        let item: ItemId = token.parse().map_err(|_| MiningError::MalformedBasket {
            index,
            token: token.to_owned(),
        })?;
        basket.push(item);
    }
    Ok(())
}

/// Reset `source` and call `f` on each of the first `limit` baskets.
/// Returns the number of baskets visited, which is less than `limit` when
/// the data runs out first.
pub fn scan<S, F>(source: &mut S, limit: usize, mut f: F) -> Result<usize>
where
    S: BasketSource + ?Sized,
    F: FnMut(&[ItemId]),
{
    source.reset()?;

    let mut basket = Vec::with_capacity(APPROX_NUM_ITEMS_IN_1_BASKET);
    let mut visited = 0;
    while visited < limit && source.read_basket(&mut basket)? {
        f(&basket);
        visited += 1;
    }

    Ok(visited)
}

/// Baskets parsed lazily from a seekable text reader.
pub struct TextBaskets<R> {
    reader: R,
    line: Vec<u8>,
    index: usize,
}

impl TextBaskets<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MiningError::DatasetUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Seek> TextBaskets<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            index: 0,
        }
    }
}

impl<R: BufRead + Seek> BasketSource for TextBaskets<R> {
    fn read_basket(&mut self, basket: &mut Basket) -> Result<bool> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }

        let line = std::str::from_utf8(&self.line).map_err(|_| MiningError::MalformedBasket {
            index: self.index,
            token: String::from_utf8_lossy(&self.line).trim_end().to_owned(),
        })?;
        parse_basket(line, self.index, basket)?;
        self.index += 1;
        Ok(true)
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.index = 0;
        Ok(())
    }
}

/// Baskets held in memory, e.g. for sharded rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBaskets {
    baskets: Vec<Basket>,
    cursor: usize,
}

impl MemoryBaskets {
    pub fn new(baskets: Vec<Basket>) -> Self {
        Self { baskets, cursor: 0 }
    }

    /// Read every basket of `source` into memory.
    pub fn load<S: BasketSource + ?Sized>(source: &mut S) -> Result<Self> {
        let mut baskets = Vec::new();
        scan(source, usize::MAX, |basket| baskets.push(basket.to_vec()))?;
        Ok(Self::new(baskets))
    }

    pub fn as_slice(&self) -> &[Basket] {
        &self.baskets
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}

impl BasketSource for MemoryBaskets {
    fn read_basket(&mut self, basket: &mut Basket) -> Result<bool> {
        match self.baskets.get(self.cursor) {
            Some(next) => {
                basket.clear();
                basket.extend_from_slice(next);
                self.cursor += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
