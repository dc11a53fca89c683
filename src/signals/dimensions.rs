//! Dimension recovery from noisy drawing text
//!
//! Drawing text (especially OCR output) mixes real dimensions with revision
//! letters, sheet counts, scales and title-block dates in one token stream.
//! Recovery runs as an ordered cascade of [`CascadeStage`]s; each stage only
//! runs while the result is still incomplete:
//!
//! 1. [`ExplicitLabels`] - `length: 4`, `w=2`, `thick 0.25`, or a combined
//!    `4" x 2" x 0.25"` which short-circuits the rest of the cascade
//! 2. [`UnlabeledTriple`] - the first bare `a x b x c`, sorted largest first
//! 3. [`CandidateMining`] - numeric tokens from the first productive
//!    [`CandidateRule`], filtered against title-block metadata, scored,
//!    unit-inferred (inch vs mm) and assigned largest first
//!
//! All thresholds live in [`ExtractionThresholds`] so they can be versioned
//! and overridden from configuration.

use std::cmp::Ordering;
use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

const NUM: &str = r"(\d+(?:\.\d+)?)";

lazy_static! {
    static ref RE_COMBINED: Regex = Regex::new(&format!(
        r#"{NUM}"?\s*x\s*{NUM}"?\s*x\s*{NUM}"?(\s*mm\b)?"#
    ))
    .expect("combined dimension regex");
    static ref RE_LENGTH: Regex =
        Regex::new(&format!(r"\b(?:length|len|l)\s*[=:]?\s*{NUM}(\s*mm\b)?"))
            .expect("length regex");
    static ref RE_WIDTH: Regex =
        Regex::new(&format!(r"\b(?:width|wide|w)\s*[=:]?\s*{NUM}(\s*mm\b)?"))
            .expect("width regex");
    static ref RE_HEIGHT: Regex = Regex::new(&format!(
        r"(?:^|[^\w-])(?:height|thickness|thick|ht|h|t)\s*[=:]?\s*{NUM}(\s*mm\b)?"
    ))
    .expect("height regex");
    static ref RE_TRIPLE: Regex =
        Regex::new(&format!(r"{NUM}\s*[x×]\s*{NUM}\s*[x×]\s*{NUM}")).expect("triple regex");
    static ref RE_INCH_MARKED: Regex =
        Regex::new(&format!(r#"{NUM}\s*(?:"|inches\b|inch\b|in\b)"#)).expect("inch regex");
    static ref RE_QUOTE_ADJACENT: Regex = Regex::new(&format!(
        r#"{NUM}\s*['"“”″′]|['"“”″′]\s*{NUM}"#
    ))
    .expect("quote regex");
    static ref RE_SYMBOL_TAGGED: Regex =
        Regex::new(&format!(r"[ø⌀]\s*{NUM}|\br\s*{NUM}")).expect("symbol regex");
    static ref RE_BARE_NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("number regex");
}

/// Title-block words whose nearby numbers are never dimensions
pub const METADATA_KEYWORDS: &[&str] = &[
    "sheet",
    "rev",
    "drawing number",
    "dwg no",
    "scale",
    "weight",
    "date",
    "drawn by",
    "checked by",
    "designed by",
];

/// Words that tend to sit next to real dimensions
pub const DIMENSION_CONTEXT_WORDS: &[&str] = &[
    "view", "section", "front", "length", "width", "height", "depth",
];

/// Tunable constants for the cascade
///
/// Every field has a default, so a configuration file only needs to name
/// the values it changes. Bump `version` whenever a default changes and add
/// a regression sample pinned to the old behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionThresholds {
    pub version: String,

    /// Raw candidate values outside [raw_min, raw_max] are discarded
    pub raw_min: f64,
    pub raw_max: f64,

    /// Max characters between a candidate and a metadata keyword
    pub metadata_window: usize,
    /// Max characters between a candidate and a dimension context word
    pub context_window: usize,

    /// Values at or above this are "significant" (likely main dimensions)
    pub significant_value: f64,
    /// Backfill candidates need at least this value and `backfill_priority`
    pub backfill_value: f64,
    pub backfill_priority: f64,
    /// A batch whose largest value exceeds this is read as millimeters
    pub millimeter_trigger: f64,

    /// Final dimensions must lie in [min_inches, max_inches]
    pub min_inches: f64,
    pub max_inches: f64,

    /// Candidates kept after ranking
    pub max_selected: usize,

    // Priority deltas
    pub diameter_bonus: f64,
    pub radius_bonus: f64,
    pub context_bonus: f64,
    pub large_value_bonus: f64,
    pub main_range_bonus: f64,
    pub mid_range_bonus: f64,
    pub tiny_value_penalty: f64,
    pub small_value_penalty: f64,
    pub frequency_bonus: f64,
}

impl Default for ExtractionThresholds {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            raw_min: 1.0,
            raw_max: 2500.0,
            metadata_window: 10,
            context_window: 20,
            significant_value: 10.0,
            backfill_value: 5.0,
            backfill_priority: 1.0,
            millimeter_trigger: 20.0,
            min_inches: 0.1,
            max_inches: 100.0,
            max_selected: 5,
            diameter_bonus: 3.0,
            radius_bonus: 2.0,
            context_bonus: 1.0,
            large_value_bonus: 0.5,
            main_range_bonus: 0.5,
            mid_range_bonus: 0.3,
            tiny_value_penalty: 2.0,
            small_value_penalty: 0.5,
            frequency_bonus: 0.5,
        }
    }
}

impl ExtractionThresholds {
    fn in_inch_range(&self, value: f64) -> bool {
        value >= self.min_inches && value <= self.max_inches
    }
}

/// Recovered length/width/height in inches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_in: Option<f64>,
    pub width_in: Option<f64>,
    pub height_in: Option<f64>,
}

impl Dimensions {
    /// True when all three dimensions are known
    pub fn is_complete(&self) -> bool {
        self.length_in.is_some() && self.width_in.is_some() && self.height_in.is_some()
    }

    /// True when no dimension is known
    pub fn is_empty(&self) -> bool {
        self.length_in.is_none() && self.width_in.is_none() && self.height_in.is_none()
    }

    /// Mean of the three dimensions, only when all are known
    pub fn mean(&self) -> Option<f64> {
        match (self.length_in, self.width_in, self.height_in) {
            (Some(l), Some(w), Some(h)) => Some((l + w + h) / 3.0),
            _ => None,
        }
    }

    /// Assign `values` in order to the slots that are still empty
    fn fill_missing(&mut self, values: impl IntoIterator<Item = f64>) -> bool {
        let mut values = values.into_iter();
        let mut changed = false;
        for slot in [&mut self.length_in, &mut self.width_in, &mut self.height_in] {
            if slot.is_none() {
                match values.next() {
                    Some(v) => {
                        *slot = Some(v);
                        changed = true;
                    }
                    None => break,
                }
            }
        }
        changed
    }
}

/// How a candidate's number should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitGuess {
    Inches,
    Millimeters,
}

/// A numeric token found by a [`CandidateRule`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericToken {
    pub value: f64,
    /// Byte span of the number in the lowercased text
    pub start: usize,
    pub end: usize,
}

/// A scored token under consideration as a dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateDimension {
    pub raw_value: f64,
    pub priority_score: f64,
    pub unit_guess: UnitGuess,
    /// How many candidates share this value (rounded to a whole number)
    pub frequency: usize,
}

impl CandidateDimension {
    /// Value in inches, rounded to 2 decimals when converted from mm
    pub fn to_inches(&self) -> f64 {
        match self.unit_guess {
            UnitGuess::Inches => self.raw_value,
            UnitGuess::Millimeters => mm_to_inches(self.raw_value),
        }
    }
}

/// Convert millimeters to inches, rounded to 2 decimals
pub fn mm_to_inches(mm: f64) -> f64 {
    round2(mm / MM_PER_INCH)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Inputs shared by all stages of one extraction
pub struct StageContext<'a> {
    /// Lowercased input text
    pub text: &'a str,
    pub thresholds: &'a ExtractionThresholds,
}

/// Whether the cascade should keep going after a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFlow {
    Continue,
    Stop,
}

/// One stage of the dimension cascade
pub trait CascadeStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fill whatever slots of `dims` this stage can
    ///
    /// Returns the flow decision and whether any slot changed.
    fn run(&self, ctx: &StageContext<'_>, dims: &mut Dimensions) -> (StageFlow, bool);
}

/// A source of candidate numbers, tried in priority order by
/// [`CandidateMining`]
pub trait CandidateRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn find(&self, text: &str) -> Vec<NumericToken>;
}

/// Collect every participating capture group of `re` as a token.
/// Groups that fail to parse are dropped.
fn tokens_from_groups(re: &Regex, text: &str) -> Vec<NumericToken> {
    let mut tokens = Vec::new();
    for caps in re.captures_iter(text) {
        for group in caps.iter().skip(1).flatten() {
            if let Ok(value) = group.as_str().parse::<f64>() {
                tokens.push(NumericToken {
                    value,
                    start: group.start(),
                    end: group.end(),
                });
            }
        }
    }
    tokens
}

/// Numbers followed by an inch marker: `3"`, `2.5 in`, `4 inches`
pub struct InchMarked;

impl CandidateRule for InchMarked {
    fn name(&self) -> &'static str {
        "inch-marked"
    }

    fn find(&self, text: &str) -> Vec<NumericToken> {
        tokens_from_groups(&RE_INCH_MARKED, text)
    }
}

/// Numbers touching any quote-like character (OCR mangles `"` freely)
pub struct QuoteAdjacent;

impl CandidateRule for QuoteAdjacent {
    fn name(&self) -> &'static str {
        "quote-adjacent"
    }

    fn find(&self, text: &str) -> Vec<NumericToken> {
        tokens_from_groups(&RE_QUOTE_ADJACENT, text)
    }
}

/// Numbers tagged with a diameter (`ø`, `⌀`) or radius (`r`) symbol
pub struct SymbolTagged;

impl CandidateRule for SymbolTagged {
    fn name(&self) -> &'static str {
        "symbol-tagged"
    }

    fn find(&self, text: &str) -> Vec<NumericToken> {
        tokens_from_groups(&RE_SYMBOL_TAGGED, text)
    }
}

/// Every bare decimal number in the text
pub struct BareNumber;

impl CandidateRule for BareNumber {
    fn name(&self) -> &'static str {
        "bare-number"
    }

    fn find(&self, text: &str) -> Vec<NumericToken> {
        RE_BARE_NUMBER
            .find_iter(text)
            .filter_map(|m| {
                m.as_str().parse::<f64>().ok().map(|value| NumericToken {
                    value,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect()
    }
}

/// Default candidate rules, most specific first
pub fn default_rules() -> Vec<Box<dyn CandidateRule>> {
    vec![
        Box::new(InchMarked),
        Box::new(QuoteAdjacent),
        Box::new(SymbolTagged),
        Box::new(BareNumber),
    ]
}

/// Parse capture `value_group`, converting when `mm_group` participated.
/// Out-of-range results are dropped.
fn labeled_value(
    caps: &Captures<'_>,
    value_group: usize,
    millimeters: bool,
    thresholds: &ExtractionThresholds,
) -> Option<f64> {
    let raw = caps.get(value_group)?.as_str().parse::<f64>().ok()?;
    let inches = if millimeters { mm_to_inches(raw) } else { raw };
    thresholds.in_inch_range(inches).then_some(inches)
}

/// Stage 1: explicit `length`/`width`/`height` labels and combined `LxWxH`
pub struct ExplicitLabels;

impl CascadeStage for ExplicitLabels {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn run(&self, ctx: &StageContext<'_>, dims: &mut Dimensions) -> (StageFlow, bool) {
        let t = ctx.thresholds;

        if let Some(caps) = RE_COMBINED.captures(ctx.text) {
            // A trailing unit applies to the whole triple
            let mm = caps.get(4).is_some();
            dims.length_in = labeled_value(&caps, 1, mm, t);
            dims.width_in = labeled_value(&caps, 2, mm, t);
            dims.height_in = labeled_value(&caps, 3, mm, t);
            debug!("combined LxWxH match: {:?}", dims);
            return (StageFlow::Stop, true);
        }

        let mut changed = false;
        for (re, slot) in [
            (&*RE_LENGTH, &mut dims.length_in),
            (&*RE_WIDTH, &mut dims.width_in),
            (&*RE_HEIGHT, &mut dims.height_in),
        ] {
            if let Some(caps) = re.captures(ctx.text) {
                let mm = caps.get(2).is_some();
                if let Some(value) = labeled_value(&caps, 1, mm, t) {
                    *slot = Some(value);
                    changed = true;
                }
            }
        }
        (StageFlow::Continue, changed)
    }
}

/// Stage 2: first unlabeled `a x b x c`, largest value becomes length
pub struct UnlabeledTriple;

impl CascadeStage for UnlabeledTriple {
    fn name(&self) -> &'static str {
        "triple"
    }

    fn run(&self, ctx: &StageContext<'_>, dims: &mut Dimensions) -> (StageFlow, bool) {
        let Some(caps) = RE_TRIPLE.captures(ctx.text) else {
            return (StageFlow::Continue, false);
        };

        let mut values: Vec<f64> = (1..=3)
            .filter_map(|i| caps.get(i)?.as_str().parse::<f64>().ok())
            .collect();
        values.sort_by(|a, b| b.total_cmp(a));

        let mut changed = false;
        for (slot, value) in [&mut dims.length_in, &mut dims.width_in, &mut dims.height_in]
            .into_iter()
            .zip(values)
        {
            if slot.is_none() && ctx.thresholds.in_inch_range(value) {
                *slot = Some(value);
                changed = true;
            }
        }
        (StageFlow::Continue, changed)
    }
}

/// Stage 3: mine, filter, score, unit-infer and assign candidate numbers
pub struct CandidateMining {
    rules: Vec<Box<dyn CandidateRule>>,
}

impl Default for CandidateMining {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl CandidateMining {
    pub fn with_rules(rules: Vec<Box<dyn CandidateRule>>) -> Self {
        Self { rules }
    }

    /// Tokens from the first rule that finds anything
    pub fn mine(&self, text: &str) -> Vec<NumericToken> {
        for rule in &self.rules {
            let tokens = rule.find(text);
            if !tokens.is_empty() {
                debug!("candidate rule '{}' found {} token(s)", rule.name(), tokens.len());
                return tokens;
            }
        }
        Vec::new()
    }

    /// Drop out-of-range and metadata tokens, then score the rest
    pub fn score(&self, ctx: &StageContext<'_>, tokens: &[NumericToken]) -> Vec<CandidateDimension> {
        let t = ctx.thresholds;
        let metadata = KeywordSpans::find(ctx.text, METADATA_KEYWORDS);
        let context = KeywordSpans::find(ctx.text, DIMENSION_CONTEXT_WORDS);

        let mut candidates: Vec<CandidateDimension> = tokens
            .iter()
            .filter(|tok| tok.value >= t.raw_min && tok.value <= t.raw_max)
            .filter(|tok| {
                let near_metadata = metadata.is_near(ctx.text, tok, t.metadata_window);
                if near_metadata {
                    trace!("dropping {} near title-block metadata", tok.value);
                }
                !near_metadata
            })
            .map(|tok| {
                let v = tok.value;
                let mut priority = 0.0;
                if preceded_by_diameter(ctx.text, tok.start) {
                    priority += t.diameter_bonus;
                } else if preceded_by_radius(ctx.text, tok.start) {
                    priority += t.radius_bonus;
                }
                if context.is_near(ctx.text, tok, t.context_window) {
                    priority += t.context_bonus;
                }
                if v > t.millimeter_trigger {
                    priority += t.large_value_bonus;
                }
                if (50.0..=200.0).contains(&v) {
                    priority += t.main_range_bonus;
                } else if (t.significant_value..50.0).contains(&v) {
                    priority += t.mid_range_bonus;
                }
                if v < t.backfill_value && priority < 2.0 {
                    priority -= t.tiny_value_penalty;
                }
                if v < t.significant_value && priority < 1.0 {
                    priority -= t.small_value_penalty;
                }
                CandidateDimension {
                    raw_value: v,
                    priority_score: priority,
                    unit_guess: UnitGuess::Inches,
                    frequency: 1,
                }
            })
            .collect();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for candidate in &candidates {
            *counts.entry(frequency_key(candidate.raw_value)).or_insert(0) += 1;
        }
        for candidate in &mut candidates {
            candidate.frequency = counts
                .get(&frequency_key(candidate.raw_value))
                .copied()
                .unwrap_or(1);
            if candidate.frequency > 1 {
                candidate.priority_score += t.frequency_bonus;
            }
            trace!(
                "candidate {} priority {:.2} frequency {}",
                candidate.raw_value,
                candidate.priority_score,
                candidate.frequency
            );
        }
        candidates
    }

    /// Pick the most plausible candidates, best first
    pub fn select(
        &self,
        thresholds: &ExtractionThresholds,
        candidates: &[CandidateDimension],
    ) -> Vec<CandidateDimension> {
        let significant: Vec<CandidateDimension> = candidates
            .iter()
            .filter(|c| c.raw_value >= thresholds.significant_value)
            .copied()
            .collect();

        let mut selected = if significant.len() >= 3 {
            significant
        } else {
            let mut backfilled = significant;
            backfilled.extend(candidates.iter().copied().filter(|c| {
                c.raw_value >= thresholds.backfill_value
                    && c.raw_value < thresholds.significant_value
                    && c.priority_score >= thresholds.backfill_priority
            }));
            if backfilled.is_empty() {
                candidates.to_vec()
            } else {
                backfilled
            }
        };

        selected.sort_by(rank);
        selected.truncate(thresholds.max_selected);
        selected
    }

    /// Read the batch as millimeters when its largest value is too big to
    /// be inches. Small values stay unconverted: they are ambiguous and
    /// usually metadata that slipped through.
    pub fn infer_units(
        &self,
        thresholds: &ExtractionThresholds,
        selected: &mut [CandidateDimension],
    ) {
        let max = selected
            .iter()
            .map(|c| c.raw_value)
            .fold(f64::NEG_INFINITY, f64::max);
        if max > thresholds.millimeter_trigger {
            debug!("largest candidate {} > {}, reading batch as mm", max, thresholds.millimeter_trigger);
            for candidate in selected.iter_mut() {
                if candidate.raw_value >= thresholds.backfill_value {
                    candidate.unit_guess = UnitGuess::Millimeters;
                }
            }
        }
    }
}

/// Priority descending, then value descending, then frequency descending
fn rank(a: &CandidateDimension, b: &CandidateDimension) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| b.raw_value.total_cmp(&a.raw_value))
        .then_with(|| b.frequency.cmp(&a.frequency))
}

impl CascadeStage for CandidateMining {
    fn name(&self) -> &'static str {
        "candidates"
    }

    fn run(&self, ctx: &StageContext<'_>, dims: &mut Dimensions) -> (StageFlow, bool) {
        let tokens = self.mine(ctx.text);
        let candidates = self.score(ctx, &tokens);
        let mut selected = self.select(ctx.thresholds, &candidates);
        self.infer_units(ctx.thresholds, &mut selected);

        let mut values: Vec<f64> = selected
            .iter()
            .map(CandidateDimension::to_inches)
            .filter(|v| ctx.thresholds.in_inch_range(*v))
            .collect();
        values.sort_by(|a, b| b.total_cmp(a));
        values.dedup();
        // A value already assigned by an earlier stage is not a new dimension
        let known = [dims.length_in, dims.width_in, dims.height_in];
        values.retain(|v| !known.contains(&Some(*v)));
        debug!(
            "{} token(s), {} candidate(s), final values {:?}",
            tokens.len(),
            candidates.len(),
            values
        );

        let changed = dims.fill_missing(values);
        (StageFlow::Continue, changed)
    }
}

/// Candidates whose values round to the same whole number share a key
fn frequency_key(value: f64) -> i64 {
    value.round() as i64
}

/// Byte spans of every occurrence of a keyword set, sorted by start
struct KeywordSpans {
    spans: Vec<(usize, usize)>,
    longest: usize,
}

impl KeywordSpans {
    fn find(text: &str, keywords: &[&str]) -> Self {
        let mut spans: Vec<(usize, usize)> = keywords
            .iter()
            .flat_map(|kw| text.match_indices(kw).map(|(i, m)| (i, i + m.len())))
            .collect();
        spans.sort_unstable();
        let longest = keywords.iter().map(|kw| kw.len()).max().unwrap_or(0);
        Self { spans, longest }
    }

    /// Character gap between the token and some keyword span is within
    /// `window` (overlap counts as zero)
    ///
    /// Only spans within `4 * window` bytes of the token can qualify, since
    /// a UTF-8 character is at most 4 bytes.
    fn is_near(&self, text: &str, tok: &NumericToken, window: usize) -> bool {
        let reach = window.saturating_mul(4);
        let lo = tok.start.saturating_sub(reach.saturating_add(self.longest));
        let hi = tok.end.saturating_add(reach);
        let first = self.spans.partition_point(|&(ks, _)| ks < lo);

        self.spans[first..]
            .iter()
            .take_while(|&&(ks, _)| ks <= hi)
            .any(|&(ks, ke)| {
                if ke <= tok.start {
                    gap_within(text, ke, tok.start, window)
                } else if tok.end <= ks {
                    gap_within(text, tok.end, ks, window)
                } else {
                    true
                }
            })
    }
}

/// `text[from..to]` holds at most `window` characters
fn gap_within(text: &str, from: usize, to: usize, window: usize) -> bool {
    let bytes = to - from;
    if bytes <= window {
        return true;
    }
    if bytes > window.saturating_mul(4) {
        return false;
    }
    text[from..to].chars().take(window + 1).count() <= window
}

fn preceded_by_diameter(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .rev()
        .take(2)
        .any(|c| c == 'ø' || c == '⌀')
}

/// An `r` standing alone (not the end of a word) right before the number
fn preceded_by_radius(text: &str, start: usize) -> bool {
    match text[..start].trim_end().strip_suffix('r') {
        Some(rest) => rest.chars().next_back().is_none_or(|c| !c.is_alphanumeric()),
        None => false,
    }
}

/// Result of one extraction run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionReport {
    pub dimensions: Dimensions,
    /// Last stage that contributed a value
    pub stage: Option<&'static str>,
}

/// The configured cascade
pub struct DimensionExtractor {
    thresholds: ExtractionThresholds,
    stages: Vec<Box<dyn CascadeStage>>,
}

impl Default for DimensionExtractor {
    fn default() -> Self {
        Self::with_thresholds(ExtractionThresholds::default())
    }
}

impl DimensionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ExtractionThresholds) -> Self {
        Self {
            thresholds,
            stages: vec![
                Box::new(ExplicitLabels),
                Box::new(UnlabeledTriple),
                Box::new(CandidateMining::default()),
            ],
        }
    }

    pub fn thresholds(&self) -> &ExtractionThresholds {
        &self.thresholds
    }

    /// Run the cascade over `text`
    pub fn extract(&self, text: &str) -> DimensionReport {
        let lower = text.to_lowercase();
        let ctx = StageContext {
            text: &lower,
            thresholds: &self.thresholds,
        };

        let mut dims = Dimensions::default();
        let mut last_stage = None;
        for stage in &self.stages {
            let (flow, changed) = stage.run(&ctx, &mut dims);
            if changed {
                last_stage = Some(stage.name());
            }
            debug!("stage '{}': {:?}", stage.name(), dims);
            if flow == StageFlow::Stop || dims.is_complete() {
                break;
            }
        }

        DimensionReport {
            dimensions: dims,
            stage: last_stage,
        }
    }
}

/// Extract dimensions with the default thresholds
pub fn extract_dimensions(text: &str) -> Dimensions {
    DimensionExtractor::default().extract(text).dimensions
}
