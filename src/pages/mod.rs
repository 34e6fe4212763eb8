/// Resource pages and the navigation map
///
/// Every page is a `ResourcePage` over a `Resource` from the catalog.
/// `PageId` is the static mapping from navigation entries to pages.
pub mod catalog;
pub mod page;

pub use page::{PageMessage, ResourcePage};

use crate::state::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageId {
    Materials,
    Customers,
    Departments,
    Employees,
    Vessels,
    Projects,
    Bom,
    Inventory,
    InventoryMovements,
    PurchaseOrders,
    SalesOrders,
}

impl PageId {
    pub const ALL: [PageId; 11] = [
        PageId::Materials,
        PageId::Customers,
        PageId::Departments,
        PageId::Employees,
        PageId::Vessels,
        PageId::Projects,
        PageId::Bom,
        PageId::Inventory,
        PageId::InventoryMovements,
        PageId::PurchaseOrders,
        PageId::SalesOrders,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PageId::Materials => "자재 관리",
            PageId::Customers => "거래처 관리",
            PageId::Departments => "부서 관리",
            PageId::Employees => "사원 관리",
            PageId::Vessels => "선박 관리",
            PageId::Projects => "프로젝트 관리",
            PageId::Bom => "BOM 관리",
            PageId::Inventory => "재고 현황",
            PageId::InventoryMovements => "입출고 이력",
            PageId::PurchaseOrders => "발주 관리",
            PageId::SalesOrders => "수주 관리",
        }
    }

    pub fn resource(self) -> Resource {
        match self {
            PageId::Materials => catalog::materials(),
            PageId::Customers => catalog::customers(),
            PageId::Departments => catalog::departments(),
            PageId::Employees => catalog::employees(),
            PageId::Vessels => catalog::vessels(),
            PageId::Projects => catalog::projects(),
            PageId::Bom => catalog::bom(),
            PageId::Inventory => catalog::inventory(),
            PageId::InventoryMovements => catalog::inventory_movements(),
            PageId::PurchaseOrders => catalog::purchase_orders(),
            PageId::SalesOrders => catalog::sales_orders(),
        }
    }
}

/// Sidebar group of pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub pages: &'static [PageId],
}

pub const SECTIONS: [Section; 4] = [
    Section {
        title: "기준정보",
        pages: &[
            PageId::Materials,
            PageId::Customers,
            PageId::Departments,
            PageId::Employees,
            PageId::Vessels,
        ],
    },
    Section {
        title: "생산관리",
        pages: &[PageId::Projects, PageId::Bom],
    },
    Section {
        title: "재고관리",
        pages: &[PageId::Inventory, PageId::InventoryMovements],
    },
    Section {
        title: "구매/영업",
        pages: &[PageId::PurchaseOrders, PageId::SalesOrders],
    },
];
