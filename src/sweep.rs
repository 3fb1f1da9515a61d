//! Scanline sweep over monotone curves.
//!
//! The sweep partitions the y axis into rows bounded by curve endpoints
//! and detected crossings, orders the curves of each row left to right,
//! and classifies every edge as entering, leaving, or irrelevant to the
//! result region. Row fragments are stitched into chains that close into
//! output subpaths, so boolean combinations and winding normalization
//! share one engine.

use crate::curve::{Curve, Dir};
use std::cmp::Ordering;

// ============================================================================
// Classification
// ============================================================================

/// Which operand list an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Left,
    Right,
}

/// Role of an edge within a row of the result region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeTag {
    /// Left boundary of a filled span.
    Enter,
    /// Right boundary of a filled span.
    Exit,
    /// No contribution to the result.
    Ignore,
}

impl EdgeTag {
    /// Output traversal direction for a boundary edge with this tag.
    pub fn dir(self) -> Dir {
        match self {
            EdgeTag::Enter => Dir::Up,
            EdgeTag::Exit | EdgeTag::Ignore => Dir::Down,
        }
    }
}

/// Stateful left-to-right classifier for one row.
///
/// Reset at each row start, fed every active edge in x order, and asked
/// whether each edge toggles the result region.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Classifier {
    /// Union of two operands.
    Add { in_left: bool, in_right: bool, in_result: bool },
    /// Left operand minus right operand.
    Subtract { in_left: bool, in_right: bool, in_result: bool },
    /// Intersection of two operands.
    Intersect { in_left: bool, in_right: bool, in_result: bool },
    /// Symmetric difference: every edge toggles.
    Xor { inside: bool },
    /// Winding normalization, non-zero rule.
    NonZero { count: i32 },
    /// Winding normalization, even-odd rule.
    EvenOdd { inside: bool },
}

impl Classifier {
    pub fn add() -> Classifier {
        Classifier::Add { in_left: false, in_right: false, in_result: false }
    }

    pub fn subtract() -> Classifier {
        Classifier::Subtract { in_left: false, in_right: false, in_result: false }
    }

    pub fn intersect() -> Classifier {
        Classifier::Intersect { in_left: false, in_right: false, in_result: false }
    }

    pub fn xor() -> Classifier {
        Classifier::Xor { inside: false }
    }

    pub fn for_fill(rule: crate::path::FillRule) -> Classifier {
        match rule {
            crate::path::FillRule::NonZero => Classifier::NonZero { count: 0 },
            crate::path::FillRule::EvenOdd => Classifier::EvenOdd { inside: false },
        }
    }

    fn new_row(&mut self) {
        match self {
            Classifier::Add { in_left, in_right, in_result }
            | Classifier::Subtract { in_left, in_right, in_result }
            | Classifier::Intersect { in_left, in_right, in_result } => {
                *in_left = false;
                *in_right = false;
                *in_result = false;
            }
            Classifier::Xor { inside } | Classifier::EvenOdd { inside } => *inside = false,
            Classifier::NonZero { count } => *count = 0,
        }
    }

    /// True when the scan position is inside the result region.
    fn inside(&self) -> bool {
        match *self {
            Classifier::Add { in_result, .. }
            | Classifier::Subtract { in_result, .. }
            | Classifier::Intersect { in_result, .. } => in_result,
            Classifier::Xor { inside } | Classifier::EvenOdd { inside } => inside,
            Classifier::NonZero { count } => count != 0,
        }
    }

    /// Feeds one edge crossing and reports its role in the result.
    fn classify(&mut self, operand: Operand, dir: Dir) -> EdgeTag {
        match self {
            Classifier::Add { in_left, in_right, in_result } => {
                toggle(in_left, in_right, operand);
                combined(in_result, *in_left || *in_right)
            }
            Classifier::Subtract { in_left, in_right, in_result } => {
                toggle(in_left, in_right, operand);
                combined(in_result, *in_left && !*in_right)
            }
            Classifier::Intersect { in_left, in_right, in_result } => {
                toggle(in_left, in_right, operand);
                combined(in_result, *in_left && *in_right)
            }
            Classifier::Xor { inside } => {
                *inside = !*inside;
                if *inside {
                    EdgeTag::Enter
                } else {
                    EdgeTag::Exit
                }
            }
            Classifier::NonZero { count } => {
                let tag = if *count == 0 {
                    EdgeTag::Enter
                } else {
                    EdgeTag::Ignore
                };
                *count += dir.sign();
                if *count == 0 {
                    EdgeTag::Exit
                } else {
                    tag
                }
            }
            Classifier::EvenOdd { inside } => {
                *inside = !*inside;
                if *inside {
                    EdgeTag::Enter
                } else {
                    EdgeTag::Exit
                }
            }
        }
    }
}

fn toggle(in_left: &mut bool, in_right: &mut bool, operand: Operand) {
    match operand {
        Operand::Left => *in_left = !*in_left,
        Operand::Right => *in_right = !*in_right,
    }
}

fn combined(in_result: &mut bool, new_state: bool) -> EdgeTag {
    if new_state == *in_result {
        EdgeTag::Ignore
    } else {
        *in_result = new_state;
        if new_state {
            EdgeTag::Enter
        } else {
            EdgeTag::Exit
        }
    }
}

// ============================================================================
// Edges, links, chains
// ============================================================================

/// A monotone curve participating in the sweep.
#[derive(Debug, Clone, Copy)]
struct Edge {
    curve: Curve,
    operand: Operand,
    tag: EdgeTag,
    /// Bottom of the most recent row this edge was kept in.
    active_y: f64,
    /// Coincidence group id within the current row, 0 if none.
    equivalence: u32,
}

impl Edge {
    fn new(curve: Curve, operand: Operand) -> Edge {
        Edge {
            curve,
            operand,
            tag: EdgeTag::Ignore,
            active_y: 0.0,
            equivalence: 0,
        }
    }

    /// True when this edge carried `tag` through a row ending at `ystart`.
    fn is_active_for(&self, ystart: f64, tag: EdgeTag) -> bool {
        self.tag == tag && self.active_y >= ystart
    }

    fn record(&mut self, yend: f64, tag: EdgeTag) {
        self.active_y = yend;
        self.tag = tag;
    }
}

/// One row fragment of an output boundary curve.
#[derive(Debug, Clone, Copy)]
struct CurveLink {
    curve: Curve,
    ytop: f64,
    ybot: f64,
    tag: EdgeTag,
    /// Next fragment downstream in the chain, arena index.
    next: Option<u32>,
}

impl CurveLink {
    fn new(curve: Curve, ytop: f64, ybot: f64, tag: EdgeTag) -> CurveLink {
        CurveLink { curve, ytop, ybot, tag, next: None }
    }

    /// X at the top of the fragment.
    fn x(&self) -> f64 {
        self.curve.x_for_y(self.ytop)
    }

    /// X at the bottom of the fragment.
    fn x_bot(&self) -> f64 {
        self.curve.x_for_y(self.ybot)
    }

    /// Extends this fragment over `other` when both cover adjacent spans
    /// of the same curve with the same role.
    fn absorb(&mut self, other: &CurveLink) -> bool {
        if self.curve != other.curve
            || self.tag != other.tag
            || self.ybot < other.ytop
            || self.ytop > other.ybot
        {
            return false;
        }
        self.ytop = self.ytop.min(other.ytop);
        self.ybot = self.ybot.max(other.ybot);
        true
    }

    /// The output curve for this fragment, traversed per its tag.
    fn sub_curve(&self) -> Curve {
        if self.ytop == self.curve.y_top() && self.ybot == self.curve.y_bot() {
            self.curve.with_direction(self.tag.dir())
        } else {
            self.curve.sub_curve(self.ytop, self.ybot, self.tag.dir())
        }
    }

    /// Subpath marker at the top of this fragment.
    fn move_to(&self) -> Curve {
        Curve::Move(glam::DVec2::new(self.x(), self.ytop))
    }
}

/// One loose end of a partially built output subpath.
///
/// Ends come in partner pairs: the enter (left) and exit (right) side of
/// the same open region. Enter chains grow top-down at the tail; exit
/// chains are stored bottom-up, growing at the head.
#[derive(Debug, Clone, Copy)]
struct ChainEnd {
    head: u32,
    tail: u32,
    partner: u32,
    tag: EdgeTag,
}

/// Working state shared by the row resolution helpers.
struct Chains {
    links: Vec<CurveLink>,
    ends: Vec<ChainEnd>,
    /// Active loose ends in left-to-right order, paired (enter, exit).
    active: Vec<u32>,
    /// Heads of completed closed subpaths.
    subcurves: Vec<u32>,
}

impl Chains {
    fn new() -> Chains {
        Chains {
            links: Vec::new(),
            ends: Vec::new(),
            active: Vec::new(),
            subcurves: Vec::new(),
        }
    }

    /// Current bottom x of a chain end.
    fn end_x(&self, end: u32) -> f64 {
        let e = &self.ends[end as usize];
        match e.tag {
            EdgeTag::Exit => self.links[e.head as usize].x_bot(),
            _ => self.links[e.tail as usize].x_bot(),
        }
    }

    /// Appends a new fragment to a loose end.
    fn add_link(&mut self, end: u32, link: u32) {
        let e = self.ends[end as usize];
        debug_assert_eq!(e.tag, self.links[link as usize].tag, "mismatched chain and fragment roles");
        match e.tag {
            EdgeTag::Enter => {
                self.links[e.tail as usize].next = Some(link);
                self.ends[end as usize].tail = link;
            }
            _ => {
                self.links[link as usize].next = Some(e.head);
                self.ends[end as usize].head = link;
            }
        }
    }

    /// Connects two loose ends at the current row bottom.
    ///
    /// If the ends were partners the subpath closes and its head fragment
    /// is returned; otherwise the two open regions merge and their outer
    /// ends become partners.
    fn link_to(&mut self, a: u32, b: u32) -> Option<u32> {
        let ta = self.ends[a as usize].tag;
        let tb = self.ends[b as usize].tag;
        debug_assert!(ta != EdgeTag::Ignore && tb != EdgeTag::Ignore, "linking a consumed chain");
        debug_assert!(ta != tb, "linking two chains of the same role");
        let (enter, exit) = if ta == EdgeTag::Enter { (a, b) } else { (b, a) };

        let enter_partner = self.ends[enter as usize].partner;
        let exit_partner = self.ends[exit as usize].partner;
        self.ends[enter as usize].tag = EdgeTag::Ignore;
        self.ends[exit as usize].tag = EdgeTag::Ignore;

        // Splice the exit list (stored bottom-up) after the enter list.
        let enter_tail = self.ends[enter as usize].tail;
        self.links[enter_tail as usize].next = Some(self.ends[exit as usize].head);
        self.ends[enter as usize].tail = self.ends[exit as usize].tail;

        if enter_partner == exit {
            // The subpath closed on itself.
            return Some(self.ends[enter as usize].head);
        }

        // Two open regions merged: re-partner their outer ends and hang
        // the concatenated list off the surviving exit side so the final
        // closure walks every fragment.
        let other_enter = exit_partner;
        let other_exit = enter_partner;
        self.ends[other_enter as usize].partner = other_exit;
        self.ends[other_exit as usize].partner = other_enter;
        let tail = self.ends[other_exit as usize].tail;
        self.links[tail as usize].next = Some(self.ends[enter as usize].head);
        self.ends[other_exit as usize].tail = self.ends[enter as usize].tail;
        None
    }

    /// Starts a new open region from an adjacent enter/exit fragment pair.
    fn begin_chain(&mut self, enter_link: u32, exit_link: u32) {
        let open = self.ends.len() as u32;
        let close = open + 1;
        self.ends.push(ChainEnd {
            head: enter_link,
            tail: enter_link,
            partner: close,
            tag: self.links[enter_link as usize].tag,
        });
        self.ends.push(ChainEnd {
            head: exit_link,
            tail: exit_link,
            partner: open,
            tag: self.links[exit_link as usize].tag,
        });
        self.active.push(open);
        self.active.push(close);
    }

    /// Closes every remaining active chain against its neighbor.
    ///
    /// Called when a row band ends with no curves below it.
    fn finalize(&mut self) {
        let active = std::mem::take(&mut self.active);
        debug_assert!(active.len() % 2 == 0, "odd number of open chains");
        let mut i = 1;
        while i < active.len() {
            if let Some(head) = self.link_to(active[i - 1], active[i]) {
                self.subcurves.push(head);
            }
            i += 2;
        }
    }

    /// Merges one row's fragments into the active chains.
    ///
    /// Both the chain list and the fragment list are in left-to-right
    /// order and pair up as (enter, exit). The three strategies, tried in
    /// order for each step: close out exhausted or x-coincident chain
    /// pairs, start chains from x-coincident fragment pairs, and
    /// otherwise connect chains to fragments one-to-one while neither
    /// side's pairing would be obstructed.
    fn resolve_row(&mut self, row: &[u32]) {
        debug_assert!(row.len() % 2 == 0, "odd number of row fragments");
        debug_assert!(self.active.len() % 2 == 0, "odd number of open chains");
        let old = std::mem::take(&mut self.active);
        let mut curchain = 0usize;
        let mut curlink = 0usize;
        loop {
            let have_chain = curchain < old.len();
            let have_link = curlink < row.len();
            if !have_chain && !have_link {
                break;
            }
            let mut connectchains = !have_link;
            let mut connectlinks = !have_chain;
            if have_chain && have_link {
                let chain = old[curchain];
                let link = row[curlink];
                let cx = self.end_x(chain);
                let lx = self.links[link as usize].x();
                connectchains = curchain % 2 == 0
                    && curchain + 1 < old.len()
                    && cx == self.end_x(old[curchain + 1]);
                connectlinks = curlink % 2 == 0
                    && curlink + 1 < row.len()
                    && lx == self.links[row[curlink + 1] as usize].x();
                if !connectchains && !connectlinks {
                    if curchain + 1 < old.len() && cx < lx {
                        connectchains = obstructs(self.end_x(old[curchain + 1]), lx, curchain);
                    }
                    if curlink + 1 < row.len() && lx < cx {
                        connectlinks =
                            obstructs(self.links[row[curlink + 1] as usize].x(), cx, curlink);
                    }
                }
            }
            if connectchains {
                if let Some(head) = self.link_to(old[curchain], old[curchain + 1]) {
                    self.subcurves.push(head);
                }
                curchain += 2;
            }
            if connectlinks {
                self.begin_chain(row[curlink], row[curlink + 1]);
                curlink += 2;
            }
            if !connectchains && !connectlinks {
                let chain = old[curchain];
                self.add_link(chain, row[curlink]);
                self.active.push(chain);
                curchain += 1;
                curlink += 1;
            }
        }
        debug_assert!(self.active.len() % 2 == 0, "odd number of open chains");
    }

    /// Flattens completed subpaths into the output curve list, merging
    /// fragments that continue the same curve across rows.
    fn into_curves(self) -> Vec<Curve> {
        let mut out = Vec::new();
        for &head in &self.subcurves {
            let mut link = self.links[head as usize];
            out.push(link.move_to());
            let mut next = link.next;
            while let Some(n) = next {
                let other = self.links[n as usize];
                if !link.absorb(&other) {
                    out.push(link.sub_curve());
                    link = other;
                }
                next = other.next;
            }
            out.push(link.sub_curve());
        }
        out
    }
}

/// Whether the x-span `v1..v2` blocks a direct chain/fragment pairing.
///
/// Enter phases use inclusive comparison so touching spans still connect
/// 4-connected regions; exit phases use strict comparison.
fn obstructs(v1: f64, v2: f64, phase: usize) -> bool {
    if phase % 2 == 0 {
        v1 <= v2
    } else {
        v1 < v2
    }
}

// ============================================================================
// Sweep driver
// ============================================================================

/// Combines two curve lists under the given classifier, returning the
/// canonical curve list of the result region.
pub(crate) fn calculate(classifier: Classifier, left: &[Curve], right: &[Curve]) -> Vec<Curve> {
    let mut edges = Vec::with_capacity(left.len() + right.len());
    for c in left {
        if c.order() > 0 {
            edges.push(Edge::new(*c, Operand::Left));
        }
    }
    for c in right {
        if c.order() > 0 {
            edges.push(Edge::new(*c, Operand::Right));
        }
    }
    prune_edges(classifier, edges)
}

fn prune_edges(mut classifier: Classifier, mut edgelist: Vec<Edge>) -> Vec<Curve> {
    let numedges = edgelist.len();
    if numedges < 2 {
        return Vec::new();
    }
    edgelist.sort_by(|a, b| {
        let ka = (a.curve.y_top(), a.curve.x_top());
        let kb = (b.curve.y_top(), b.curve.x_top());
        ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
    });

    let mut chains = Chains::new();
    let mut row_links: Vec<u32> = Vec::new();
    let mut yrange = [edgelist[0].curve.y_top(); 2];
    let mut left = 0usize;
    let mut right = 0usize;

    while left < numedges {
        let mut y = yrange[0];
        // Drop edges that ended above this row, compacting survivors to
        // the top of the active window.
        let mut next = right;
        let mut cur = right;
        while cur > left {
            let e = edgelist[cur - 1];
            if e.curve.y_bot() > y {
                next -= 1;
                edgelist[next] = e;
            }
            cur -= 1;
        }
        left = next;
        if left >= right {
            if right >= numedges {
                break;
            }
            // Gap between bands: close out the finished geometry.
            y = edgelist[right].curve.y_top();
            if y > yrange[0] {
                chains.finalize();
            }
            yrange[0] = y;
        }
        // Absorb edges starting at or above the row top.
        while right < numedges && edgelist[right].curve.y_top() <= y {
            right += 1;
        }
        yrange[1] = edgelist[left].curve.y_bot();
        if right < numedges {
            let ynext = edgelist[right].curve.y_top();
            if yrange[1] > ynext {
                yrange[1] = ynext;
            }
        }

        // Insertion sort by x over the row, tracking coincidence groups.
        // Ordering a pair may shrink the row above their first crossing.
        let mut nexteq: u32 = 1;
        for cur in left..right {
            let mut e = edgelist[cur];
            e.equivalence = 0;
            let mut pos = cur;
            while pos > left {
                let prev = edgelist[pos - 1];
                let ordering = e.curve.order_over(&prev.curve, &mut yrange);
                if ordering != Ordering::Less {
                    if ordering == Ordering::Equal {
                        let mut eq = prev.equivalence;
                        if eq == 0 {
                            eq = nexteq;
                            nexteq += 1;
                            edgelist[pos - 1].equivalence = eq;
                        }
                        e.equivalence = eq;
                    }
                    break;
                }
                edgelist[pos] = prev;
                pos -= 1;
            }
            edgelist[pos] = e;
        }

        // Classify left to right, emitting one fragment per boundary edge.
        classifier.new_row();
        let ystart = yrange[0];
        let yend = yrange[1];
        debug_assert!(yend > ystart, "empty sweep row: {ystart} -> {yend}");
        row_links.clear();
        let mut cur = left;
        while cur < right {
            let mut chosen = cur;
            let eq = edgelist[cur].equivalence;
            let tag;
            if eq != 0 {
                // Coincident group: all members cross here together, so
                // classify each but emit at most one representative.
                let was_inside = classifier.inside();
                let want = if was_inside { EdgeTag::Exit } else { EdgeTag::Enter };
                let mut active_match = None;
                let mut longest = cur;
                let mut furthest = yend;
                loop {
                    let ge = edgelist[cur];
                    classifier.classify(ge.operand, ge.curve.dir());
                    if active_match.is_none() && ge.is_active_for(ystart, want) {
                        active_match = Some(cur);
                    }
                    if ge.curve.y_bot() > furthest {
                        furthest = ge.curve.y_bot();
                        longest = cur;
                    }
                    cur += 1;
                    if cur >= right || edgelist[cur].equivalence != eq {
                        break;
                    }
                }
                cur -= 1;
                if classifier.inside() == was_inside {
                    // The group cancels out; the sliver between its
                    // members is dropped.
                    tag = EdgeTag::Ignore;
                } else {
                    chosen = active_match.unwrap_or(longest);
                    tag = want;
                }
            } else {
                let e = edgelist[cur];
                tag = classifier.classify(e.operand, e.curve.dir());
            }
            if tag != EdgeTag::Ignore {
                edgelist[chosen].record(yend, tag);
                let idx = chains.links.len() as u32;
                chains
                    .links
                    .push(CurveLink::new(edgelist[chosen].curve, ystart, yend, tag));
                row_links.push(idx);
            }
            cur += 1;
        }
        debug_assert!(!classifier.inside(), "region left open at end of row");
        chains.resolve_row(&row_links);
        yrange[0] = yend;
    }
    chains.finalize();
    chains.into_curves()
}
