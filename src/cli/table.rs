use std::fmt;

/// Box-drawn table: one column of row labels, then right-aligned columns
pub struct Table {
    title: Option<String>,
    grid: GridFmt,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    labels: ColFmt,
    columns: Vec<ColFmt>,
}

impl Table {
    /// Table with one column per header, `corner` labels the row labels
    pub fn new<S>(corner: &str, headers: &[S]) -> Self
    where
        S: ToString,
    {
        Self {
            title: None,
            grid: GridFmt {
                labels: ColFmt::with_label(BoxFmt::from(corner.to_string())),
                columns: headers
                    .iter()
                    .map(|h| ColFmt::with_label(BoxFmt::from(h.to_string())))
                    .collect(),
            },
        }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    /// Add a line, missing cells are left blank and extra ones ignored
    pub fn push_line<S>(&mut self, label: S, cells: Vec<String>)
    where
        S: ToString,
    {
        self.grid.labels.push(BoxFmt::from(label.to_string()));
        let mut cells = cells.into_iter();
        for col in &mut self.grid.columns {
            col.push(BoxFmt::from(cells.next().unwrap_or_default()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.labels.len() == 0
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let padding = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", padding, self.text)
        } else {
            write!(f, " {}{} ", self.text, padding)
        }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn write_label(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label.write(f, self.width, false)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize, right: bool) -> fmt::Result {
        self.boxes[idx].write(f, self.width, right)
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, " {}", title)?;
        }
        write!(f, "{}", self.grid)
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // upper border
        write!(f, "{}", ULCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", LOJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", URCORNER)?;
        // title line
        write!(f, "{}", VLINE)?;
        self.labels.write_label(f)?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f)?;
        }
        writeln!(f, "{}", VLINE)?;
        // separator
        write!(f, "{}", RTJOIN)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", CROSS)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", LTJOIN)?;
        // main block
        for idx in 0..self.labels.len() {
            write!(f, "{}", VLINE)?;
            self.labels.write_item(f, idx, false)?;
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx, true)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        // lower border
        write!(f, "{}", DLCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", HIJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", DRCORNER)
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        let mut table = Table::new("Month", &["Total"]).with_title("Trend");
        table.push_line("Jan", vec!["100.00".to_string()]);
        table.push_line("Feb", vec!["2200.50".to_string()]);
        let expected = " Trend
┌───────┬─────────┐
│ Month │ Total   │
├───────┼─────────┤
│ Jan   │  100.00 │
│ Feb   │ 2200.50 │
└───────┴─────────┘
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn missing_cells() {
        let mut table = Table::new("", &["A", "B"]);
        assert!(table.is_empty());
        table.push_line("x", vec!["1".to_string()]);
        assert!(!table.is_empty());
        assert!(table.to_string().contains("│ x │ 1 │   │"));
    }
}
