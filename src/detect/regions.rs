//! Connected foreground regions of a binary image.

use super::imaging::FOREGROUND;
use image::GrayImage;
use std::collections::VecDeque;

/// An 8-connected foreground region and its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Number of foreground pixels.
    pub area: usize,
    /// Leftmost column.
    pub min_x: u32,
    /// Rightmost column (inclusive).
    pub max_x: u32,
    /// Topmost row.
    pub min_y: u32,
    /// Bottom row (inclusive).
    pub max_y: u32,
}

impl Region {
    /// Bounding box width in columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Bounding box height in rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Label 8-connected foreground regions in raster-scan order.
#[must_use]
pub fn find_regions(binary: &GrayImage) -> Vec<Region> {
    let (width, height) = binary.dimensions();
    let mut visited = vec![false; (width as usize) * (height as usize)];
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    for y in 0..height {
        for x in 0..width {
            if visited[index(x, y)] || binary.get_pixel(x, y)[0] != FOREGROUND {
                continue;
            }

            let mut region = Region {
                area: 0,
                min_x: x,
                max_x: x,
                min_y: y,
                max_y: y,
            };
            visited[index(x, y)] = true;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                region.area += 1;
                region.min_x = region.min_x.min(cx);
                region.max_x = region.max_x.max(cx);
                region.min_y = region.min_y.min(cy);
                region.max_y = region.max_y.max(cy);

                for (nx, ny) in neighbors(cx, cy, width, height) {
                    let i = index(nx, ny);
                    if !visited[i] && binary.get_pixel(nx, ny)[0] == FOREGROUND {
                        visited[i] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            regions.push(region);
        }
    }

    regions
}

fn neighbors(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let xs = x.saturating_sub(1)..=(x + 1).min(width - 1);
    xs.flat_map(move |nx| {
        (y.saturating_sub(1)..=(y + 1).min(height - 1)).map(move |ny| (nx, ny))
    })
    .filter(move |&(nx, ny)| (nx, ny) != (x, y))
}

/// Pick the dominant region: largest area, ties going to the leftmost.
///
/// Among regions equal in both area and left edge, the first in scan
/// order wins.
#[must_use]
pub fn dominant_region(regions: &[Region]) -> Option<Region> {
    regions.iter().copied().reduce(|best, candidate| {
        let larger = candidate.area > best.area;
        let earlier = candidate.area == best.area && candidate.min_x < best.min_x;
        if larger || earlier { candidate } else { best }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Luma;

    fn paint(img: &mut GrayImage, points: &[(u32, u32)]) {
        for &(x, y) in points {
            img.put_pixel(x, y, Luma([FOREGROUND]));
        }
    }

    #[test]
    fn test_empty_image_has_no_regions() {
        assert!(find_regions(&GrayImage::new(5, 5)).is_empty());
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let mut img = GrayImage::new(4, 4);
        paint(&mut img, &[(0, 0), (1, 1), (2, 2)]);
        let regions = find_regions(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 3);
        assert_eq!(regions[0].width(), 3);
        assert_eq!(regions[0].height(), 3);
    }

    #[test]
    fn test_separate_regions_and_bounding_boxes() {
        let mut img = GrayImage::new(8, 6);
        paint(&mut img, &[(0, 0), (0, 1), (0, 2)]);
        paint(&mut img, &[(4, 1), (5, 1), (4, 2), (5, 2), (4, 3), (5, 3)]);
        let regions = find_regions(&img);
        assert_eq!(regions.len(), 2);

        let big = dominant_region(&regions).unwrap();
        assert_eq!(big.area, 6);
        assert_eq!((big.min_x, big.width()), (4, 2));
        assert_eq!((big.min_y, big.height()), (1, 3));
    }

    #[test]
    fn test_tie_goes_to_leftmost_region() {
        let a = Region {
            area: 10,
            min_x: 7,
            max_x: 7,
            min_y: 0,
            max_y: 9,
        };
        let b = Region {
            min_x: 2,
            max_x: 2,
            ..a
        };
        assert_eq!(dominant_region(&[a, b]).unwrap().min_x, 2);
        assert_eq!(dominant_region(&[b, a]).unwrap().min_x, 2);
    }

    #[test]
    fn test_dominant_of_nothing_is_none() {
        assert!(dominant_region(&[]).is_none());
    }
}
