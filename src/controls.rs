use crate::data::{YearInterval, YEAR_MAX, YEAR_MIN};
use crate::map::MapStyle;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Change listeners for one control
pub struct Subscribers<T: ?Sized> {
    handlers: Vec<Box<dyn FnMut(&T)>>,
}

impl<T: ?Sized> Subscribers<T> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&T) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn notify(&mut self, value: &T) {
        for handler in &mut self.handlers {
            handler(value);
        }
    }
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Which end of the range a drag moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Thumb {
    Start,
    End,
}

/// Inclusive integer range picker over years. Subscribers only hear about a
/// drag once it is released.
pub struct YearRangeSlider {
    pub description: &'static str,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    /// Notify on every drag tick instead of on release
    pub continuous_update: bool,
    /// Share of the control row the slider occupies
    pub width_percent: u16,
    value: YearInterval,
    pending: Option<YearInterval>,
    subscribers: Subscribers<YearInterval>,
}

impl YearRangeSlider {
    pub fn new() -> Self {
        Self {
            description: "Year:",
            min: YEAR_MIN,
            max: YEAR_MAX,
            step: 1,
            continuous_update: false,
            width_percent: 80,
            value: YearInterval::default(),
            pending: None,
            subscribers: Subscribers::new(),
        }
    }

    pub fn with_value(mut self, value: YearInterval) -> Self {
        self.value = value;
        self
    }

    /// Committed value
    pub fn value(&self) -> YearInterval {
        self.value
    }

    /// Value to draw: the in-progress drag if any, else the committed value
    pub fn displayed(&self) -> YearInterval {
        self.pending.unwrap_or(self.value)
    }

    pub fn is_dragging(&self) -> bool {
        self.pending.is_some()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&YearInterval) + 'static) {
        self.subscribers.subscribe(handler);
    }

    /// Move one thumb by `steps` steps
    pub fn drag(&mut self, thumb: Thumb, steps: i32) {
        let current = self.displayed();
        let year = match thumb {
            Thumb::Start => current.start(),
            Thumb::End => current.end(),
        };
        self.drag_to(thumb, year + steps * self.step);
    }

    /// Move one thumb to `year`; thumbs never cross and stay in bounds
    pub fn drag_to(&mut self, thumb: Thumb, year: i32) {
        let current = self.displayed();
        let next = match thumb {
            Thumb::Start => YearInterval::new(year.clamp(self.min, current.end()), current.end()),
            Thumb::End => YearInterval::new(current.start(), year.clamp(current.start(), self.max)),
        };
        // Bounds were clamped above, so construction cannot fail
        if let Ok(next) = next {
            self.pending = Some(next);
        }
        if self.continuous_update {
            self.release();
        }
    }

    /// Thumb closest to `year` (ties go to the end thumb when right of it)
    pub fn nearest_thumb(&self, year: i32) -> Thumb {
        let current = self.displayed();
        if (year - current.start()).abs() < (year - current.end()).abs() {
            Thumb::Start
        } else if year < current.start() {
            Thumb::Start
        } else {
            Thumb::End
        }
    }

    /// Commit the drag; notifies once if the value changed
    pub fn release(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => self.commit(pending),
            None => false,
        }
    }

    /// Set the value directly, discarding any drag in progress
    pub fn set_value(&mut self, value: YearInterval) -> bool {
        self.pending = None;
        self.commit(value)
    }

    fn commit(&mut self, value: YearInterval) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        debug!(start = value.start(), end = value.end(), "year range changed");
        self.subscribers.notify(&value);
        true
    }
}

impl Default for YearRangeSlider {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-choice dropdown over the map style names
pub struct StyleDropdown {
    pub description: &'static str,
    options: Vec<&'static str>,
    selected: usize,
    subscribers: Subscribers<str>,
}

impl StyleDropdown {
    pub fn new() -> Self {
        Self {
            description: "Map Style:",
            options: MapStyle::ALL.iter().map(|s| s.name()).collect(),
            selected: 0,
            subscribers: Subscribers::new(),
        }
    }

    pub fn options(&self) -> &[&'static str] {
        &self.options
    }

    pub fn value(&self) -> &'static str {
        self.options[self.selected]
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&str) + 'static) {
        self.subscribers.subscribe(handler);
    }

    /// Select by index; notifies if the value changed
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.options.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        let value = self.options[index];
        debug!(style = value, "map style changed");
        self.subscribers.notify(value);
        true
    }

    /// Select by name; false if the name is not an option or already selected
    pub fn select_name(&mut self, name: &str) -> bool {
        match self.options.iter().position(|&o| o == name) {
            Some(index) => self.select(index),
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        self.select((self.selected + 1) % self.options.len())
    }

    pub fn prev(&mut self) -> bool {
        let n = self.options.len();
        self.select((self.selected + n - 1) % n)
    }
}

impl Default for StyleDropdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire `handler` to both controls. Any committed change calls it with both
/// controls' current values; it is also called once right away with the
/// initial values.
pub fn bind<H>(year: &mut YearRangeSlider, style: &mut StyleDropdown, handler: H)
where
    H: FnMut(YearInterval, &str) + 'static,
{
    let current = Rc::new(RefCell::new((year.value(), style.value())));
    let handler = Rc::new(RefCell::new(handler));

    {
        let current = Rc::clone(&current);
        let handler = Rc::clone(&handler);
        year.subscribe(move |interval| {
            let style = {
                let mut state = current.borrow_mut();
                state.0 = *interval;
                state.1
            };
            (*handler.borrow_mut())(*interval, style);
        });
    }

    {
        let current = Rc::clone(&current);
        let handler = Rc::clone(&handler);
        let options = style.options().to_vec();
        style.subscribe(move |name| {
            // Options are 'static; map the borrowed name back to one
            let name = options.iter().copied().find(|&o| o == name).unwrap_or("Plain");
            let interval = {
                let mut state = current.borrow_mut();
                state.1 = name;
                state.0
            };
            (*handler.borrow_mut())(interval, name);
        });
    }

    let (interval, name) = *current.borrow();
    (*handler.borrow_mut())(interval, name);
}
