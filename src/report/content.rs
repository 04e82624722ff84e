//! Static encouragement printed at the end of every report.

#[derive(Debug, Clone, Copy)]
pub struct Devotional {
    pub title: &'static str,
    pub reference: &'static str,
    pub verse: &'static str,
    pub reflection: &'static str,
}

pub const DEVOTIONALS: &[Devotional] = &[
    Devotional {
        title: "Freedom Is the Goal",
        reference: "Proverbs 22:7 (KJV)",
        verse: "The rich ruleth over the poor, and the borrower is servant to the lender.",
        reflection: "Every payment you make loosens that grip a little more. \
            The plan in this report is not about deprivation; it is about \
            walking out of servitude one month at a time.",
    },
    Devotional {
        title: "Steady Plenty",
        reference: "Proverbs 21:5 (KJV)",
        verse: "The thoughts of the diligent tend only to plenteousness; \
            but of every one that is hasty only to want.",
        reflection: "Diligence rarely looks dramatic. It looks like sending the \
            same extra payment again this month, and the month after that.",
    },
    Devotional {
        title: "Keep Going",
        reference: "Galatians 6:9 (KJV)",
        verse: "And let us not be weary in well doing: for in due season we \
            shall reap, if we faint not.",
        reflection: "The middle months are the hardest. When the balance seems \
            stuck, look back at how far the schedule has already carried you.",
    },
];

pub const PRAYER_TITLE: &str = "A Prayer for the Journey";

pub const PRAYER: &str = "Lord, thank You for providing for me today. Give me \
    wisdom with every dollar, patience when progress feels slow, and \
    gratitude when each debt is paid. Guard my heart from comparison and \
    fear, and let this freedom become generosity toward others. Amen.";

/// Picks the devotional shown with a plan; stable for a given plan length.
pub fn devotional_for(total_months: u32) -> &'static Devotional {
    &DEVOTIONALS[total_months as usize % DEVOTIONALS.len()]
}
