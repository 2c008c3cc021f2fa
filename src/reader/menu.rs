/// A pointer location in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        point.x >= self.x
            && point.y >= self.y
            && (point.x as i64) < right
            && (point.y as i64) < bottom
    }
}

/// Visibility of the control menu plus the surfaces that keep it open.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    open: bool,
    menu_region: Option<Region>,
    reader_region: Option<Region>,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.menu_region = None;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.menu_region = None;
    }

    /// Where the menu is drawn. Only meaningful while open.
    pub fn set_menu_region(&mut self, region: Option<Region>) {
        self.menu_region = if self.open { region } else { None };
    }

    pub fn set_reader_region(&mut self, region: Option<Region>) {
        self.reader_region = region;
    }

    /// Pointer-down observer for the whole document. Closes the menu when the
    /// press lands outside both the menu and the reading surface. Returns
    /// whether the menu was closed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let (Some(menu), Some(reader)) = (self.menu_region, self.reader_region) else {
            return false;
        };
        if !self.open || menu.contains(point) || reader.contains(point) {
            return false;
        }
        self.close();
        true
    }
}
