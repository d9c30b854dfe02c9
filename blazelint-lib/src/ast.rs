use std::fmt;

/// A source position (1-based line and column) attached to every node that
/// can appear in a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// A fully-owned stylesheet: the flat list of top-level style rules.
/// Nested (SCSS-style) rules hang off their parent `StyleRule`.
#[derive(Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Visit every style rule in document order, nested rules included.
    pub fn for_each_rule<'a, F: FnMut(&'a StyleRule)>(&'a self, mut f: F) {
        fn walk<'a, F: FnMut(&'a StyleRule)>(rule: &'a StyleRule, f: &mut F) {
            f(rule);
            for nested in &rule.nested {
                walk(nested, f);
            }
        }
        for rule in &self.rules {
            walk(rule, &mut f);
        }
    }
}

/// One selector group plus its declaration block. A comma-separated selector
/// list shares a single block, so `selectors` may hold several entries.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    /// Rules nested inside this block (SCSS syntax).
    pub nested: Vec<StyleRule>,
    /// Position of the first selector token.
    pub position: Position,
    /// Position of the opening brace of the declaration block.
    pub block_position: Position,
}

/// An ordered sequence of simple-selector components. Combinators and
/// attribute conditions are not retained; the lint rules never match
/// selectors against elements.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub parts: Vec<SimpleSelector>,
}

/// The closed set of simple-selector components the linter distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Element type, e.g. `div`.
    Type(String),
    /// `.class`
    Class(String),
    /// `#id`
    Id(String),
    /// `*`
    Universal,
    /// SCSS parent reference `&`.
    Parent,
    /// `:name` (single colon).
    PseudoClass(String),
    /// `::name` (double colon).
    PseudoElement(String),
}

/// A property name (lower-cased) and its value expression.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    pub position: Position,
}

/// A declaration value: the ordered components to the right of the colon.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub components: Vec<ValueComponent>,
}

impl Value {
    pub fn new(components: Vec<ValueComponent>) -> Self {
        Value { components }
    }

    /// First component of the value, if any.
    pub fn first(&self) -> Option<&ValueComponent> {
        self.components.first()
    }

    /// Iterate the top-level dimension components of the value. Dimensions
    /// inside function calls are not included.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.components.iter().filter_map(|c| match c {
            ValueComponent::Dimension(dim) => Some(dim),
            _ => None,
        })
    }

    /// Textual rendering of the value, trimmed, for literal comparisons
    /// such as `display: none` or `outline: 0`.
    pub fn to_css_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// A number with a unit, e.g. `12px`. Carries its own position so unit
/// violations point at the dimension rather than the whole declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub value: f32,
    pub unit: String,
    pub position: Position,
}

/// The closed set of value components the linter distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueComponent {
    /// A bare number, e.g. `0` or `1.5`.
    Number(f32),
    /// A percentage; stored as the printed value (`50` for `50%`).
    Percentage(f32),
    /// A number + unit pair.
    Dimension(Dimension),
    /// Hex color literal without the leading `#`, e.g. `aabbcc` or `abc`.
    HexColor(String),
    /// A bare identifier or keyword, e.g. `none`, `solid`, `red`.
    Ident(String),
    /// A SCSS variable reference, e.g. `$accent`.
    Variable(String),
    /// A quoted string, rendered with double quotes.
    QuotedString(String),
    /// A function call, e.g. `rgb(0, 0, 0)` or `var(--fg)`.
    Function {
        name: String,
        args: Vec<ValueComponent>,
    },
}

/// Print a float the way CSS sources usually write it: `0`, `12`, `1.5`.
fn write_number(f: &mut fmt::Formatter<'_>, value: f32) -> fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for ValueComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueComponent::Number(n) => write_number(f, *n),
            ValueComponent::Percentage(p) => {
                write_number(f, *p)?;
                write!(f, "%")
            }
            ValueComponent::Dimension(dim) => {
                write_number(f, dim.value)?;
                write!(f, "{}", dim.unit)
            }
            ValueComponent::HexColor(hex) => write!(f, "#{}", hex),
            ValueComponent::Ident(name) => write!(f, "{}", name),
            ValueComponent::Variable(name) => write!(f, "${}", name),
            ValueComponent::QuotedString(text) => write!(f, "\"{}\"", text),
            ValueComponent::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
