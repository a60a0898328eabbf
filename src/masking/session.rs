use super::command::{is_skip, Answer, Command, HELP};
use super::frontend::{Console, Exporter, PlotSnapshot, SpectrumView};
use super::interpolate::{self, InterpolationKind, Replacement};
use super::ledger::{MaskEntry, MaskLedger};
use super::region::Region;
use crate::data::model::{IndexRange, SampleSeries};
use crate::error::MaskError;

const RULE: &str = "--------------------------------------------------------------------";

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a top-level command.
    Ready,
    /// Inside the select / preview / confirm loop of `mask`.
    Masking,
    /// Inside the list / remove dialogue of `regions`.
    Reviewing,
    /// `quit` was issued or input ran out.
    Closed,
}

/// The collaborators a session drives.
pub struct Frontend<'a> {
    pub console: &'a mut dyn Console,
    pub view: &'a mut dyn SpectrumView,
    pub exporter: &'a mut dyn Exporter,
}

/// Result of a prompt that expects a value.
enum Reply<T> {
    Value(T),
    /// The user typed `q` to back out.
    Skip,
    /// Input is exhausted.
    Closed,
}

/// Interactive masking of one spectrum.
///
/// Owns the series and the ledger for the whole session; every command
/// handler returns the state the session moves to next.
pub struct MaskingSession {
    series: SampleSeries,
    ledger: MaskLedger,
    kind: InterpolationKind,
    state: SessionState,
    /// Ledger changed since the last successful export.
    unsaved: bool,
}

impl MaskingSession {
    pub fn new(series: SampleSeries, kind: InterpolationKind) -> Self {
        Self {
            series,
            ledger: MaskLedger::new(),
            kind,
            state: SessionState::Ready,
            unsaved: false,
        }
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn ledger(&self) -> &MaskLedger {
        &self.ledger
    }

    pub fn kind(&self) -> InterpolationKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Hand back the corrected series once the session is over.
    pub fn into_series(self) -> SampleSeries {
        self.series
    }

    pub fn snapshot(&self) -> PlotSnapshot {
        PlotSnapshot {
            spectrum: self.series.working().clone(),
            masks: self.ledger.list(),
            kind: self.kind,
        }
    }

    /// Print the help, draw the spectrum and process commands until `quit` or
    /// end of input.
    pub fn run(&mut self, io: &mut Frontend<'_>) {
        io.console.say(RULE);
        io.console.say("BAD PIXEL MASKER");
        io.console.say(HELP);
        io.console.say(RULE);
        self.redraw(io);

        while self.state != SessionState::Closed {
            let next = match io.console.ask("Enter a command: ") {
                Some(line) => self.handle(Command::parse(&line), io),
                None => self.quit(io),
            };
            self.state = next;
        }
    }

    /// Apply one command and record the resulting state.
    pub fn handle(&mut self, command: Command, io: &mut Frontend<'_>) -> SessionState {
        if self.state == SessionState::Closed {
            log::warn!("Ignoring {command:?}: session is closed");
            return SessionState::Closed;
        }
        log::debug!("Command: {command:?}");

        let next = match command {
            Command::Quit => self.quit(io),
            Command::Mask => {
                self.state = SessionState::Masking;
                self.mask(io)
            }
            Command::ChangeInterpolation => self.change_interpolation(io),
            Command::Write => self.write(io),
            Command::ListRegions => {
                self.state = SessionState::Reviewing;
                self.list_regions(io)
            }
            Command::Help => {
                io.console.say(RULE);
                io.console.say(HELP);
                io.console.say(RULE);
                SessionState::Ready
            }
            Command::Unrecognized(text) => {
                log::warn!("Unrecognized command: {text:?}");
                io.console
                    .say(&format!("'{text}' is not a command. Type 'commands' for the list."));
                SessionState::Ready
            }
        };
        self.state = next;
        next
    }

    // -----------------------------------------------------------------------
    // mask
    // -----------------------------------------------------------------------

    fn mask(&mut self, io: &mut Frontend<'_>) -> SessionState {
        loop {
            io.console.say(RULE);
            io.console
                .say("INSTRUCT: Use the figure to determine the location of the bad pixels.");
            let region = match prompt_value(
                io.console,
                "Enter wavelength range of bad pixel(s) (comma separated, q to cancel): ",
                str::parse::<Region>,
            ) {
                Reply::Value(region) => region,
                Reply::Skip => return SessionState::Ready,
                Reply::Closed => return self.quit(io),
            };

            let range = match region.resolve(self.series.working()) {
                Ok(range) => range,
                Err(e) => {
                    report(io.console, &e);
                    return SessionState::Ready;
                }
            };

            let window = match prompt_value(
                io.console,
                "Enter size of window to use either side of bad region: ",
                parse_window,
            ) {
                Reply::Value(window) => window,
                Reply::Skip => return SessionState::Ready,
                Reply::Closed => return self.quit(io),
            };

            let previous = self.series.working().flux[range.as_range()].to_vec();
            let replacement = match self.apply_interpolation(range, window) {
                Ok(replacement) => replacement,
                Err(e) => {
                    report(io.console, &e);
                    return SessionState::Ready;
                }
            };
            self.describe(io.console, region, window, &replacement);
            self.redraw(io);

            let Some(answer) = io.console.ask("Do you want to keep these changes? [y/n]: ") else {
                self.restore(range, &previous);
                self.redraw(io);
                return self.quit(io);
            };
            match Answer::parse(&answer) {
                Answer::Yes => {
                    self.ledger.add(region);
                    self.unsaved = true;
                    self.redraw(io);
                    io.console.say("Keeping mask, back to command page.");
                    io.console.say(RULE);
                    return SessionState::Ready;
                }
                Answer::No => {}
                Answer::Other => {
                    io.console
                        .say("That's not an answer, removing the mask anyway.");
                }
            }
            self.restore(range, &previous);
            log::info!("Rejected mask {region}, restored indices {range}");
            self.redraw(io);
        }
    }

    /// Fit the current interpolant around `range` with `window` anchors per
    /// side and write the result into the working flux.  On error nothing is
    /// changed.
    pub fn apply_interpolation(
        &mut self,
        range: IndexRange,
        window: usize,
    ) -> Result<Replacement, MaskError> {
        if window == 0 {
            return Err(MaskError::InvalidRadius);
        }
        let radius = window.saturating_add(1);
        let replacement = interpolate::fit(self.series.working(), range, radius, self.kind)?;

        let working = self.series.working();
        for (i, new) in range.as_range().zip(&replacement.values) {
            log::debug!("{} {} --> {}", working.wavelength[i], working.flux[i], new);
        }
        self.series.apply_range(range, &replacement.values)?;
        Ok(replacement)
    }

    /// Put back the flux a rejected attempt overwrote.  Earlier accepted
    /// masks under `range` keep their values.
    fn restore(&mut self, range: IndexRange, previous: &[f64]) {
        if let Err(e) = self.series.apply_range(range, previous) {
            log::error!("Could not restore indices {range}: {e}");
        }
    }

    fn describe(
        &self,
        console: &mut dyn Console,
        region: Region,
        window: usize,
        replacement: &Replacement,
    ) {
        let lam = &self.series.working().wavelength;
        let (left, right) = (&replacement.left, &replacement.right);
        console.say(&format!("Wavelength region of bad pixels selected: {region}"));
        console.say(&format!("This corresponds to indexes: {}", replacement.range));
        console.say(&format!(
            "Interpolating ({}) using {window} pixels on either side of the bad region.",
            self.kind
        ));
        console.say(&format!(
            "Interpolating using indexes: {} to {} and {} to {}",
            left.start,
            left.end - 1,
            right.start,
            right.end - 1
        ));
        console.say(&format!(
            "Corresponding wavelength region: {} to {} and {} to {}",
            lam[left.start],
            lam[left.end - 1],
            lam[right.start],
            lam[right.end - 1]
        ));
    }

    // -----------------------------------------------------------------------
    // funcType
    // -----------------------------------------------------------------------

    fn change_interpolation(&mut self, io: &mut Frontend<'_>) -> SessionState {
        io.console.say(RULE);
        io.console
            .say(&format!("The current interpolation function is: {}", self.kind));
        let options: Vec<&str> = InterpolationKind::ALL.iter().map(|k| k.as_str()).collect();
        io.console
            .say(&format!("The options are: {}", options.join(", ")));

        let Some(input) = io.console.ask("Enter an interpolation function or (q,Q to skip): ")
        else {
            return self.quit(io);
        };
        if is_skip(&input) {
            io.console
                .say(&format!("The interpolation function is still: {}", self.kind));
        } else {
            match input.parse::<InterpolationKind>() {
                Ok(kind) => {
                    self.kind = kind;
                    log::info!("Interpolation kind set to {kind}");
                    io.console
                        .say(&format!("Changed interpolation function to: {kind}"));
                    self.redraw(io);
                }
                Err(e) => report(io.console, &e),
            }
        }
        io.console.say(RULE);
        SessionState::Ready
    }

    // -----------------------------------------------------------------------
    // write
    // -----------------------------------------------------------------------

    fn write(&mut self, io: &mut Frontend<'_>) -> SessionState {
        io.console.say(RULE);
        match io.exporter.export(self.series.working()) {
            Ok(path) => {
                self.unsaved = false;
                io.console
                    .say(&format!("New table written to file: {}", path.display()));
                io.console
                    .say("NB: whatever is currently on the plot is what was written.");
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                io.console.say(&format!("-----ERROR: could not write file: {e:#}"));
            }
        }
        io.console.say(RULE);
        SessionState::Ready
    }

    // -----------------------------------------------------------------------
    // regions
    // -----------------------------------------------------------------------

    fn list_regions(&mut self, io: &mut Frontend<'_>) -> SessionState {
        io.console.say(RULE);
        io.console
            .say("Here is the current list of regions you have masked:");
        io.console.say(&self.ledger.to_string());

        let Some(answer) = io.console.ask("Do you want to remove any regions? (y/n): ") else {
            return self.quit(io);
        };
        match Answer::parse(&answer) {
            Answer::Yes => {
                let id = match prompt_value(
                    io.console,
                    "Type the number you want to remove: ",
                    parse_id,
                ) {
                    Reply::Value(id) => id,
                    Reply::Skip => return SessionState::Ready,
                    Reply::Closed => return self.quit(io),
                };
                match self.remove_mask(id) {
                    Ok(entry) => {
                        io.console.say(&format!(
                            "Removed region {}: {}",
                            entry.id, entry.region
                        ));
                        io.console
                            .say(&format!("Current regions: {}", self.ledger));
                        self.redraw(io);
                    }
                    Err(e) => report(io.console, &e),
                }
            }
            Answer::No => io.console.say("okay."),
            Answer::Other => io.console.say("That wasn't an answer, back to the command page."),
        }
        io.console.say(RULE);
        SessionState::Ready
    }

    /// Revert the working flux under mask `id` to the original and drop the
    /// ledger entry.  Unknown ids change nothing.
    pub fn remove_mask(&mut self, id: u32) -> Result<MaskEntry, MaskError> {
        let entry = self.ledger.get(id)?;
        let range = entry.region.resolve(self.series.working())?;
        self.series.revert_range(range);
        self.unsaved = true;
        self.ledger.remove(id)
    }

    // -----------------------------------------------------------------------
    // quit
    // -----------------------------------------------------------------------

    fn quit(&mut self, io: &mut Frontend<'_>) -> SessionState {
        io.console.say(RULE);
        io.console.say("The regions you masked out were:");
        io.console.say(&self.ledger.to_string());
        if self.unsaved {
            io.console
                .say("Warning: masks changed since the last write were not saved.");
        }
        io.console.say("EXITING....");
        io.console.say(RULE);
        log::info!("Session closed with {} mask(s)", self.ledger.len());
        self.state = SessionState::Closed;
        SessionState::Closed
    }

    fn redraw(&self, io: &mut Frontend<'_>) {
        io.view.redraw(self.snapshot());
    }
}

// ---------------------------------------------------------------------------
// Prompt helpers
// ---------------------------------------------------------------------------

/// Ask until `parse` accepts the answer, reporting every rejection.
fn prompt_value<T>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, MaskError>,
) -> Reply<T> {
    loop {
        let Some(line) = console.ask(prompt) else {
            return Reply::Closed;
        };
        if is_skip(&line) {
            return Reply::Skip;
        }
        match parse(&line) {
            Ok(value) => return Reply::Value(value),
            Err(e) => report(console, &e),
        }
    }
}

fn report(console: &mut dyn Console, err: &MaskError) {
    log::warn!("{err}");
    console.say(&format!("-----ERROR: {err}"));
}

fn parse_window(input: &str) -> Result<usize, MaskError> {
    let window = input
        .trim()
        .parse::<usize>()
        .map_err(|e| MaskError::parse(input, e.to_string()))?;
    if window == 0 {
        return Err(MaskError::parse(input, "window must be at least 1 pixel"));
    }
    if window.checked_add(1).is_none() {
        return Err(MaskError::parse(input, "window is too large"));
    }
    Ok(window)
}

fn parse_id(input: &str) -> Result<u32, MaskError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|e| MaskError::parse(input, e.to_string()))
}
