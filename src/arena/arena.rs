use std::fmt::Display;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaKind {
    Permanent,
    ConstraintSystem,
}

impl ArenaKind {
    const ALL: [ArenaKind; 2] = [ArenaKind::Permanent, ArenaKind::ConstraintSystem];

    fn index(self) -> usize {
        match self {
            ArenaKind::Permanent => 0,
            ArenaKind::ConstraintSystem => 1,
        }
    }
}

impl Display for ArenaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaKind::Permanent => write!(f, "permanent"),
            ArenaKind::ConstraintSystem => write!(f, "constraint-system"),
        }
    }
}

/// Where an allocation landed. `epoch` identifies the lifetime of the region
/// at the time of the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub kind: ArenaKind,
    pub epoch: u32,
    pub offset: usize,
}

type Finalizer = Box<dyn FnOnce()>;

struct Region {
    active: bool,
    epoch: u32,
    offset: usize,
    bytes_used: usize,
    allocations: usize,
    finalizers: Vec<Finalizer>,
}

impl Region {
    fn new(active: bool, epoch: u32) -> Self {
        Region {
            active,
            epoch,
            offset: 0,
            bytes_used: 0,
            allocations: 0,
            finalizers: vec![],
        }
    }

    fn run_finalizers(&mut self) {
        while let Some(finalizer) = self.finalizers.pop() {
            finalizer();
        }
    }
}

pub struct Arena {
    regions: [Region; 2],
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an arena whose permanent region is live. The permanent region
    /// always has epoch 0; transient regions start counting at 1.
    pub fn new() -> Self {
        Arena {
            regions: [Region::new(true, 0), Region::new(false, 0)],
        }
    }

    fn region(&self, kind: ArenaKind) -> &Region {
        &self.regions[kind.index()]
    }

    fn region_mut(&mut self, kind: ArenaKind) -> &mut Region {
        &mut self.regions[kind.index()]
    }

    /// Reserves `size` bytes aligned to `align` in the region `kind`.
    pub fn allocate(&mut self, size: usize, align: usize, kind: ArenaKind) -> Allocation {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        let region = self.region_mut(kind);
        assert!(region.active, "allocation in inactive {} region", kind);

        let offset = (region.offset + align - 1) & !(align - 1);
        region.bytes_used += (offset - region.offset) + size;
        region.offset = offset + size;
        region.allocations += 1;

        Allocation {
            kind,
            epoch: region.epoch,
            offset,
        }
    }

    /// Bytes handed out by the region since it began, padding included.
    pub fn region_usage(&self, kind: ArenaKind) -> usize {
        self.region(kind).bytes_used
    }

    pub fn allocation_count(&self, kind: ArenaKind) -> usize {
        self.region(kind).allocations
    }

    pub fn is_active(&self, kind: ArenaKind) -> bool {
        self.region(kind).active
    }

    pub fn epoch(&self, kind: ArenaKind) -> u32 {
        self.region(kind).epoch
    }

    /// Checks whether an allocation still belongs to a live region.
    pub fn is_live(&self, allocation: &Allocation) -> bool {
        let region = self.region(allocation.kind);
        region.active && region.epoch == allocation.epoch
    }

    /// Starts a transient region and returns its epoch.
    pub fn begin_region(&mut self, kind: ArenaKind) -> u32 {
        assert!(kind != ArenaKind::Permanent, "the permanent region cannot be restarted");
        let region = self.region_mut(kind);
        assert!(!region.active, "{} region is already active", kind);

        region.epoch += 1;
        region.active = true;
        region.offset = 0;
        region.bytes_used = 0;
        region.allocations = 0;
        debug!(region = %kind, epoch = region.epoch, "region begun");
        region.epoch
    }

    /// Tears a transient region down: finalizers run in reverse registration
    /// order and every allocation made in it becomes stale.
    pub fn end_region(&mut self, kind: ArenaKind) {
        assert!(kind != ArenaKind::Permanent, "the permanent region cannot be ended");
        let region = self.region_mut(kind);
        assert!(region.active, "{} region is not active", kind);

        debug!(
            region = %kind,
            epoch = region.epoch,
            bytes = region.bytes_used,
            allocations = region.allocations,
            "region ended"
        );
        region.run_finalizers();
        region.active = false;
        region.offset = 0;
        region.bytes_used = 0;
        region.allocations = 0;
    }

    /// Registers cleanup to run when the region `kind` ends.
    pub fn add_finalizer(&mut self, kind: ArenaKind, finalizer: impl FnOnce() + 'static) {
        let region = self.region_mut(kind);
        assert!(region.active, "finalizer registered on inactive {} region", kind);
        region.finalizers.push(Box::new(finalizer));
    }

    pub fn dump(&self) -> String {
        ArenaKind::ALL
            .iter()
            .map(|kind| {
                let region = self.region(*kind);
                format!(
                    "{} region: epoch {}, {} bytes in {} allocations{}",
                    kind,
                    region.epoch,
                    region.bytes_used,
                    region.allocations,
                    if region.active { "" } else { " (inactive)" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        for region in self.regions.iter_mut().rev() {
            region.run_finalizers();
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dump())
    }
}
