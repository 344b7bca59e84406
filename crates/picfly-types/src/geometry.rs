use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Normalized, half-open rectangle in device pixels: `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl SelectionRect {
    /// Build from two arbitrary corners, whatever direction the drag went.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width as i32),
            y1: y.saturating_add(height as i32),
        }
    }

    pub fn width(&self) -> u32 {
        (self.x1 - self.x0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Overlap of both rectangles, `None` when they do not overlap.
    pub fn intersect(&self, other: &SelectionRect) -> Option<SelectionRect> {
        let rect = SelectionRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (!rect.is_empty()).then_some(rect)
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &SelectionRect) -> SelectionRect {
        SelectionRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn inflate(&self, by: i32) -> SelectionRect {
        SelectionRect {
            x0: self.x0 - by,
            y0: self.y0 - by,
            x1: self.x1 + by,
            y1: self.y1 + by,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> SelectionRect {
        SelectionRect {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }
}

/// Combined virtual-screen area spanning every monitor.
///
/// The origin can be negative when a monitor sits left of or above the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn as_rect(&self) -> SelectionRect {
        SelectionRect::from_origin_size(self.x, self.y, self.width, self.height)
    }

    /// Bounding box of all given monitor areas, `None` for an empty iterator.
    pub fn union_of<I>(monitors: I) -> Option<ScreenBounds>
    where
        I: IntoIterator<Item = ScreenBounds>,
    {
        monitors
            .into_iter()
            .map(|m| m.as_rect())
            .reduce(|acc, r| acc.union(&r))
            .map(|r| ScreenBounds {
                x: r.x0,
                y: r.y0,
                width: r.width(),
                height: r.height(),
            })
    }

    /// Translate a point in virtual-screen coordinates into bounds-local coordinates.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_normalize_in_every_direction() {
        let corners = [
            (Point::new(100, 100), Point::new(300, 50)),
            (Point::new(300, 50), Point::new(100, 100)),
            (Point::new(300, 100), Point::new(100, 50)),
            (Point::new(100, 50), Point::new(300, 100)),
        ];
        for (a, b) in corners {
            let rect = SelectionRect::from_corners(a, b);
            assert_eq!(
                rect,
                SelectionRect {
                    x0: 100,
                    y0: 50,
                    x1: 300,
                    y1: 100
                }
            );
            assert!(rect.x0 <= rect.x1 && rect.y0 <= rect.y1);
        }
    }

    #[test]
    fn same_point_is_empty() {
        let p = Point::new(7, 7);
        assert!(SelectionRect::from_corners(p, p).is_empty());
        assert!(SelectionRect::from_corners(p, Point::new(20, 7)).is_empty());
    }

    #[test]
    fn intersect_clips_and_rejects_disjoint() {
        let bounds = SelectionRect::from_origin_size(0, 0, 100, 100);
        let rect = SelectionRect {
            x0: -20,
            y0: 50,
            x1: 40,
            y1: 180,
        };
        assert_eq!(
            rect.intersect(&bounds),
            Some(SelectionRect {
                x0: 0,
                y0: 50,
                x1: 40,
                y1: 100
            })
        );

        let outside = SelectionRect::from_origin_size(200, 200, 5, 5);
        assert_eq!(outside.intersect(&bounds), None);
    }

    #[test]
    fn union_of_monitors_handles_negative_origin() {
        let left = ScreenBounds {
            x: -1280,
            y: 0,
            width: 1280,
            height: 1024,
        };
        let primary = ScreenBounds {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        };
        let bounds = ScreenBounds::union_of([left, primary]).unwrap();
        assert_eq!(
            bounds,
            ScreenBounds {
                x: -1280,
                y: 0,
                width: 3200,
                height: 1080
            }
        );
        assert_eq!(bounds.to_local(Point::new(0, 10)), Point::new(1280, 10));
        assert!(ScreenBounds::union_of([]).is_none());
    }
}
