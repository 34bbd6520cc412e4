//! Run logging: a typed, iteration-indexed table persisted to a directory.
//!
//! A [`Logger`] owns one run directory. Scalar, text, and image values are
//! written into an in-memory table whose rows are iteration numbers and
//! whose columns are named, typed series. The table lands on disk as
//! `data.csv`, the column type map as `data.meta`, and logged images as
//! PNG files next to them.
//!
//! Writes are buffered: the table is only written every `save_freq`
//! mutating calls. Call [`Logger::flush`] before process exit to make the
//! tail of the run durable.

pub mod confirm;
mod image;
mod metadata;
mod table;

use std::collections::BTreeMap;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::error::{MnemosyneError, Result};

pub use self::confirm::DirConflict;
pub use self::image::ImageData;
pub use self::metadata::ColumnType;
pub use self::table::Value;

use self::table::Table;

/// File name of the tabular data inside a run directory.
pub const DATA_FILE: &str = "data.csv";
/// File name of the column type map inside a run directory.
pub const META_FILE: &str = "data.meta";
/// Mutating calls between automatic table writes.
pub const DEFAULT_SAVE_FREQ: u32 = 50;

type ConfirmFn = Box<dyn FnMut(&DirConflict) -> bool>;

/// Configures how a [`Logger`] opens its run directory.
///
/// An existing directory with logged data is a conflict: it is only
/// reopened when `overwrite` is set or the confirmation callback agrees.
/// Without either, opening fails; existing data is never silently
/// touched.
pub struct LoggerBuilder {
    overwrite: bool,
    save_freq: u32,
    confirm: Option<ConfirmFn>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        LoggerBuilder {
            overwrite: false,
            save_freq: DEFAULT_SAVE_FREQ,
            confirm: None,
        }
    }

    /// Skip the conflict check and reuse existing data unconditionally.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Number of mutating calls between automatic table writes.
    pub fn save_freq(mut self, save_freq: u32) -> Self {
        self.save_freq = save_freq;
        self
    }

    /// Decide conflicts with a callback instead of the `overwrite` flag.
    ///
    /// [`confirm::stdin_confirm`] and [`confirm::stdin_confirm_or_exit`]
    /// are ready-made interactive choices.
    pub fn confirm_with<F>(mut self, decide: F) -> Self
    where
        F: FnMut(&DirConflict) -> bool + 'static,
    {
        self.confirm = Some(Box::new(decide));
        self
    }

    /// Open (or create) the run directory at `dir`.
    pub fn open<P: AsRef<Path>>(mut self, dir: P) -> Result<Logger> {
        let dir = dir.as_ref().to_path_buf();
        let data_path = dir.join(DATA_FILE);

        let (table, types) = if data_path.exists() {
            let (table, types) = load_existing(&dir)?;
            if table.column_count() > 0 {
                let allowed = self.overwrite || {
                    let conflict = DirConflict { dir: dir.clone() };
                    match self.confirm.as_mut() {
                        Some(decide) => decide(&conflict),
                        None => false,
                    }
                };
                if !allowed {
                    return Err(MnemosyneError::ExistingData(dir));
                }
            }
            (table, types)
        } else {
            fs::create_dir_all(&dir)?;
            (Table::new(), BTreeMap::new())
        };

        Ok(Logger {
            dir,
            table,
            types,
            meta_changed: false,
            save_freq: self.save_freq,
            save_calls: 0,
            prefix: String::new(),
            postfix: String::new(),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records scalars, text snippets, and images for one training run.
///
/// Column names are derived from the caller-given name by wrapping it in
/// the current prefix and postfix. A column's type is fixed by its first
/// write; later writes with a different type fail and leave the table
/// untouched.
#[derive(Debug)]
pub struct Logger {
    dir: PathBuf,
    table: Table,
    types: BTreeMap<String, ColumnType>,
    meta_changed: bool,
    save_freq: u32,
    save_calls: u32,
    prefix: String,
    postfix: String,
}

impl Logger {
    /// Open `dir` with default settings; `overwrite` skips the conflict
    /// check for directories that already hold data.
    pub fn open<P: AsRef<Path>>(dir: P, overwrite: bool) -> Result<Self> {
        LoggerBuilder::new().overwrite(overwrite).open(dir)
    }

    /// Load a read view of an existing run directory.
    ///
    /// Unlike [`Logger::open`] this never creates the directory; it fails
    /// with [`MnemosyneError::RunNotFound`] when `dir` does not exist.
    pub fn snapshot<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MnemosyneError::RunNotFound(dir.to_path_buf()));
        }
        LoggerBuilder::new().overwrite(true).open(dir)
    }

    /// The run directory this logger writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Add a scalar value.
    ///
    /// If no column with the resolved name exists yet, one of type
    /// [`ColumnType::Scalar`] is created. With `iteration` unset the value
    /// is appended at the current row count.
    pub fn add_scalar(&mut self, name: &str, value: f64, iteration: Option<i64>) -> Result<()> {
        self.insert_scalar(name, value, iteration)?;
        self.save(false)
    }

    /// Add a text value. Same contract as [`Logger::add_scalar`] with
    /// column type [`ColumnType::Text`].
    pub fn add_text(&mut self, name: &str, value: &str, iteration: Option<i64>) -> Result<()> {
        let name = self.resolve_name(name);
        self.ensure_column(&name, ColumnType::Text)?;
        let iteration = iteration.unwrap_or(self.table.row_count() as i64);
        self.table.set(&name, iteration, Value::Text(value.to_string()));
        self.save(false)
    }

    /// Add an image.
    ///
    /// The pixels are stored as `<dir>/<resolved-name>-<iteration>.png`
    /// (subdirectories are created as needed, since column names may
    /// contain path separators) and the cell records that path.
    pub fn add_image(
        &mut self,
        name: &str,
        value: &ImageData,
        iteration: Option<i64>,
    ) -> Result<()> {
        value.validate()?;
        let name = self.resolve_name(name);
        self.ensure_column(&name, ColumnType::Image)?;
        let iteration = iteration.unwrap_or(self.table.row_count() as i64);

        let img_path = self.dir.join(format!("{}-{}.png", name, iteration));
        if let Some(parent) = img_path.parent() {
            fs::create_dir_all(parent)?;
        }
        value.save_png(&img_path)?;

        self.table
            .set(&name, iteration, Value::Image(img_path.to_string_lossy().into_owned()));
        self.save(false)
    }

    /// Add multiple scalars sharing one iteration.
    ///
    /// `pre` and `post` temporarily extend the current prefix and postfix
    /// for the whole batch. The default iteration is computed once up
    /// front so the batch cannot drift across rows.
    pub fn add_scalars(
        &mut self,
        pre: &str,
        post: &str,
        iteration: Option<i64>,
        values: &[(&str, f64)],
    ) -> Result<()> {
        let old_prefix_len = self.prefix.len();
        let old_postfix_len = self.postfix.len();
        self.prefix.push_str(pre);
        self.postfix.push_str(post);

        let iteration = iteration.unwrap_or(self.table.row_count() as i64);
        let result = values
            .iter()
            .try_for_each(|(name, value)| self.insert_scalar(name, *value, Some(iteration)));

        self.prefix.truncate(old_prefix_len);
        self.postfix.truncate(old_postfix_len);
        result?;
        self.save(false)
    }

    /// Force write all buffered data to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.save(true)
    }

    /// Append `segment` to the name prefix.
    pub fn add_to_prefix(&mut self, segment: &str) {
        self.prefix.push_str(segment);
    }

    /// Remove `segment` from the end of the prefix. Fails without
    /// mutating state when the prefix does not end with it.
    pub fn remove_from_prefix(&mut self, segment: &str) -> Result<()> {
        if !self.prefix.ends_with(segment) {
            return Err(MnemosyneError::invalid_parameter(
                "segment".to_string(),
                format!("can only remove the last part of the prefix '{}'", self.prefix),
            ));
        }
        let new_len = self.prefix.len() - segment.len();
        self.prefix.truncate(new_len);
        Ok(())
    }

    /// Append `segment` to the name postfix.
    pub fn add_to_postfix(&mut self, segment: &str) {
        self.postfix.push_str(segment);
    }

    /// Remove `segment` from the end of the postfix. Fails without
    /// mutating state when the postfix does not end with it.
    pub fn remove_from_postfix(&mut self, segment: &str) -> Result<()> {
        if !self.postfix.ends_with(segment) {
            return Err(MnemosyneError::invalid_parameter(
                "segment".to_string(),
                format!("can only remove the last part of the postfix '{}'", self.postfix),
            ));
        }
        let new_len = self.postfix.len() - segment.len();
        self.postfix.truncate(new_len);
        Ok(())
    }

    /// Push `segment` onto the prefix for the lifetime of the returned
    /// guard. The guard pops it again on drop, so nested prefix regions
    /// cannot be left mismatched.
    pub fn scoped_prefix(&mut self, segment: &str) -> ScopedPrefix<'_> {
        self.prefix.push_str(segment);
        ScopedPrefix {
            logger: self,
            segment: segment.to_string(),
        }
    }

    /// Postfix counterpart of [`Logger::scoped_prefix`].
    pub fn scoped_postfix(&mut self, segment: &str) -> ScopedPostfix<'_> {
        self.postfix.push_str(segment);
        ScopedPostfix {
            logger: self,
            segment: segment.to_string(),
        }
    }

    /// Current name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current name postfix.
    pub fn postfix(&self) -> &str {
        &self.postfix
    }

    /// Column names in creation order.
    pub fn columns(&self) -> Vec<String> {
        self.table.columns().map(str::to_string).collect()
    }

    /// The type of `name`, if such a column exists.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.types.get(name).copied()
    }

    /// Number of distinct iterations present.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Iterations where `name` holds a value, ascending.
    pub fn non_null_index(&self, name: &str) -> Result<Vec<i64>> {
        self.table
            .non_null_index(name)
            .ok_or_else(|| MnemosyneError::ColumnNotFound(name.to_string()))
    }

    /// The populated `(iteration, value)` pairs of a scalar column,
    /// ordered by iteration.
    pub fn scalar_series(&self, name: &str) -> Result<Vec<(i64, f64)>> {
        self.typed_cells(name, ColumnType::Scalar)?
            .map(|(it, v)| match v {
                Value::Scalar(x) => Ok((it, *x)),
                _ => Err(MnemosyneError::corrupt(format!(
                    "non-scalar cell in scalar column '{}'",
                    name
                ))),
            })
            .collect()
    }

    /// The populated `(iteration, value)` pairs of a text column,
    /// ordered by iteration.
    pub fn text_series(&self, name: &str) -> Result<Vec<(i64, String)>> {
        self.typed_cells(name, ColumnType::Text)?
            .map(|(it, v)| match v {
                Value::Text(s) => Ok((it, s.clone())),
                _ => Err(MnemosyneError::corrupt(format!(
                    "non-text cell in text column '{}'",
                    name
                ))),
            })
            .collect()
    }

    /// The stored file path of an image column at `iteration`.
    pub fn image_path(&self, name: &str, iteration: i64) -> Result<PathBuf> {
        self.check_column(name, ColumnType::Image)?;
        match self.table.get(name, iteration) {
            Some(Value::Image(path)) => Ok(PathBuf::from(path)),
            Some(_) => Err(MnemosyneError::corrupt(format!(
                "non-image cell in image column '{}'",
                name
            ))),
            None => Err(MnemosyneError::MissingCell {
                column: name.to_string(),
                iteration,
            }),
        }
    }

    fn resolve_name(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.postfix)
    }

    /// The single guarded insert path: creates the column with `ty` on
    /// first use, or verifies the existing type.
    fn ensure_column(&mut self, name: &str, ty: ColumnType) -> Result<()> {
        match self.types.get(name) {
            None => {
                self.types.insert(name.to_string(), ty);
                self.table.add_column(name);
                self.meta_changed = true;
                Ok(())
            }
            Some(&actual) if actual == ty => Ok(()),
            Some(&actual) => Err(MnemosyneError::type_mismatch(name, ty, actual)),
        }
    }

    fn check_column(&self, name: &str, ty: ColumnType) -> Result<()> {
        match self.types.get(name) {
            None => Err(MnemosyneError::ColumnNotFound(name.to_string())),
            Some(&actual) if actual == ty => Ok(()),
            Some(&actual) => Err(MnemosyneError::type_mismatch(name, ty, actual)),
        }
    }

    fn typed_cells(
        &self,
        name: &str,
        ty: ColumnType,
    ) -> Result<impl Iterator<Item = (i64, &Value)>> {
        self.check_column(name, ty)?;
        Ok(self.table.cells(name).into_iter().flatten())
    }

    fn insert_scalar(&mut self, name: &str, value: f64, iteration: Option<i64>) -> Result<()> {
        let name = self.resolve_name(name);
        self.ensure_column(&name, ColumnType::Scalar)?;
        let iteration = iteration.unwrap_or(self.table.row_count() as i64);
        self.table.set(&name, iteration, Value::Scalar(value));
        Ok(())
    }

    /// Buffered save. Counts the call; writes the table once the counter
    /// reaches `save_freq` or `force` is set. The metadata file is only
    /// written when the type map changed since the last write.
    fn save(&mut self, force: bool) -> Result<()> {
        self.save_calls += 1;
        if force || self.save_calls >= self.save_freq {
            self.write_table()?;
            let meta_path = self.dir.join(META_FILE);
            if self.meta_changed || !meta_path.exists() {
                metadata::write(&meta_path, &self.types)?;
                self.meta_changed = false;
            }
            self.save_calls = 0;
        }
        Ok(())
    }

    fn write_table(&self) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.dir.join(DATA_FILE))?;

        let mut header = Vec::with_capacity(self.table.column_count() + 1);
        header.push("iteration".to_string());
        header.extend(self.table.columns().map(str::to_string));
        writer.write_record(&header)?;

        for iteration in self.table.iterations() {
            let mut record = Vec::with_capacity(header.len());
            record.push(iteration.to_string());
            for column in self.table.columns() {
                record.push(match self.table.get(column, iteration) {
                    Some(Value::Scalar(v)) => v.to_string(),
                    Some(Value::Text(s)) => s.clone(),
                    Some(Value::Image(p)) => p.clone(),
                    None => String::new(),
                });
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.save_calls > 0 || self.meta_changed {
            let _ = self.save(true);
        }
    }
}

/// RAII guard returned by [`Logger::scoped_prefix`]. Dereferences to the
/// logger; pops its segment from the prefix on drop.
pub struct ScopedPrefix<'a> {
    logger: &'a mut Logger,
    segment: String,
}

impl Deref for ScopedPrefix<'_> {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        self.logger
    }
}

impl DerefMut for ScopedPrefix<'_> {
    fn deref_mut(&mut self) -> &mut Logger {
        self.logger
    }
}

impl Drop for ScopedPrefix<'_> {
    fn drop(&mut self) {
        if self.logger.remove_from_prefix(&self.segment).is_err() {
            log::warn!(
                "prefix '{}' no longer ends with scoped segment '{}'",
                self.logger.prefix,
                self.segment
            );
        }
    }
}

/// RAII guard returned by [`Logger::scoped_postfix`].
pub struct ScopedPostfix<'a> {
    logger: &'a mut Logger,
    segment: String,
}

impl Deref for ScopedPostfix<'_> {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        self.logger
    }
}

impl DerefMut for ScopedPostfix<'_> {
    fn deref_mut(&mut self) -> &mut Logger {
        self.logger
    }
}

impl Drop for ScopedPostfix<'_> {
    fn drop(&mut self) {
        if self.logger.remove_from_postfix(&self.segment).is_err() {
            log::warn!(
                "postfix '{}' no longer ends with scoped segment '{}'",
                self.logger.postfix,
                self.segment
            );
        }
    }
}

/// Load and validate `data.csv` + `data.meta` from an existing run
/// directory. Key-set mismatches between the two files are fatal.
fn load_existing(dir: &Path) -> Result<(Table, BTreeMap<String, ColumnType>)> {
    let types = metadata::load(&dir.join(META_FILE))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(dir.join(DATA_FILE))?;
    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    for column in &columns {
        if !types.contains_key(column) {
            return Err(MnemosyneError::corrupt(format!(
                "column '{}' present in {} but missing from {}",
                column, DATA_FILE, META_FILE
            )));
        }
    }
    for column in types.keys() {
        if !columns.iter().any(|c| c == column) {
            return Err(MnemosyneError::corrupt(format!(
                "column '{}' present in {} but missing from {}",
                column, META_FILE, DATA_FILE
            )));
        }
    }

    let mut table = Table::new();
    for column in &columns {
        table.add_column(column);
    }

    for record in reader.records() {
        let record = record?;
        let raw_iteration = record.get(0).unwrap_or("");
        let iteration: i64 = raw_iteration.trim().parse().map_err(|_| {
            MnemosyneError::corrupt(format!("bad iteration index '{}'", raw_iteration))
        })?;

        for (i, column) in columns.iter().enumerate() {
            let field = record.get(i + 1).unwrap_or("");
            if field.is_empty() {
                continue;
            }
            let value = match types[column] {
                ColumnType::Scalar => {
                    let v: f64 = field.parse().map_err(|_| {
                        MnemosyneError::corrupt(format!(
                            "bad scalar '{}' in column '{}' at iteration {}",
                            field, column, iteration
                        ))
                    })?;
                    Value::Scalar(v)
                }
                ColumnType::Text => Value::Text(field.to_string()),
                ColumnType::Image => Value::Image(field.to_string()),
            };
            table.set(column, iteration, value);
        }
    }

    Ok((table, types))
}
