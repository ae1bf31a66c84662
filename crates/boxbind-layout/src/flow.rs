//! Flow combinators: relate many regions at once.
//!
//! Every function here merges the regions' layouts into one graph and
//! then adds the pairwise equations. [`row`] and [`column`] additionally
//! return a bounding region that spans the run, handy as a target for
//! [`Region::fix`] or a grid slice.

use boxbind_symbolic::Expr;

use crate::geometry::Frame;
use crate::region::Region;
use crate::LayoutError;

/// Chain regions left to right: each one's right edge sits `spacing`
/// before the next one's left edge. Vertical placement is untouched.
pub fn hcat(regions: &[&Region], spacing: impl Into<Expr>) -> Result<(), LayoutError> {
    let spacing = spacing.into();
    merge_all(regions)?;
    for pair in regions.windows(2) {
        let layout = pair[0].layout();
        layout.equate(pair[0].right() + spacing.clone(), pair[1].left());
    }
    Ok(())
}

/// Chain regions top to bottom: each one's bottom edge sits `spacing`
/// above the next one's top edge. Horizontal placement is untouched.
pub fn vcat(regions: &[&Region], spacing: impl Into<Expr>) -> Result<(), LayoutError> {
    let spacing = spacing.into();
    merge_all(regions)?;
    for pair in regions.windows(2) {
        let layout = pair[0].layout();
        layout.equate(pair[0].bottom() + spacing.clone(), pair[1].top());
    }
    Ok(())
}

/// Equate the named edges across all regions.
///
/// `edges` is a string of edge letters: `t`, `r`, `b`, `l`. For example
/// `align("tb", ...)` makes every region share its top and bottom edges.
pub fn align(edges: &str, regions: &[&Region]) -> Result<(), LayoutError> {
    merge_all(regions)?;
    for edge in edges.chars() {
        let pick = match edge {
            't' => Region::top,
            'r' => Region::right,
            'b' => Region::bottom,
            'l' => Region::left,
            other => return Err(LayoutError::UnknownEdge(other)),
        };
        for pair in regions.windows(2) {
            pair[0].layout().equate(pick(pair[0]), pick(pair[1]));
        }
    }
    Ok(())
}

/// Lay regions out side by side with shared top and bottom edges.
///
/// Returns a region spanning the whole run, from the first region's
/// left edge to the last one's right edge.
pub fn row(regions: &[&Region], spacing: impl Into<Expr>) -> Result<Region, LayoutError> {
    hcat(regions, spacing)?;
    align("tb", regions)?;
    bounding(regions)
}

/// Stack regions with shared left and right edges.
///
/// Returns a region spanning the whole run, from the first region's top
/// edge to the last one's bottom edge.
pub fn column(regions: &[&Region], spacing: impl Into<Expr>) -> Result<Region, LayoutError> {
    vcat(regions, spacing)?;
    align("lr", regions)?;
    bounding(regions)
}

/// Give every region the same aspect ratio, `width == ratio * height`.
pub fn aspect(ratio: f64, regions: &[&Region]) -> Result<(), LayoutError> {
    merge_all(regions)?;
    for region in regions {
        region
            .layout()
            .equate(region.width(), region.height() * ratio);
    }
    Ok(())
}

/// Give every region the same width.
pub fn set_width(width: impl Into<Expr>, regions: &[&Region]) -> Result<(), LayoutError> {
    let width = width.into();
    merge_all(regions)?;
    for region in regions {
        region.layout().equate(region.width(), width.clone());
    }
    Ok(())
}

/// Give every region the same height.
pub fn set_height(height: impl Into<Expr>, regions: &[&Region]) -> Result<(), LayoutError> {
    let height = height.into();
    merge_all(regions)?;
    for region in regions {
        region.layout().equate(region.height(), height.clone());
    }
    Ok(())
}

/// Give every region the same width and height.
pub fn set_size(
    width: impl Into<Expr>,
    height: impl Into<Expr>,
    regions: &[&Region],
) -> Result<(), LayoutError> {
    let (width, height) = (width.into(), height.into());
    set_width(width, regions)?;
    set_height(height, regions)
}

fn merge_all(regions: &[&Region]) -> Result<(), LayoutError> {
    let first = regions.first().ok_or(LayoutError::NoRegions)?;
    for region in &regions[1..] {
        first.layout().merge(region.layout());
    }
    Ok(())
}

/// A region spanning from the first region's top-left to the last one's
/// bottom-right, in the (already merged) shared layout.
fn bounding(regions: &[&Region]) -> Result<Region, LayoutError> {
    let first = regions.first().ok_or(LayoutError::NoRegions)?;
    let last = regions.last().ok_or(LayoutError::NoRegions)?;
    let frame = Frame::new(first.top(), last.right(), last.bottom(), first.left());
    Ok(Region::from_frame(first.layout().clone(), frame))
}
