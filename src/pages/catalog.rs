/// Resource definitions for every page
///
/// Headers are what the grid and the detail panel show; accessors are the
/// JSON field names of the back end.
use crate::state::data::Column;
use crate::state::resource::{BulkStyle, InsertPosition, Resource, SubResource};

// Detail selects start on the first option; search selects start on "" (no filter).
const MATERIAL_TYPES: &[&str] = &["원자재", "부자재", "소모품"];
const MATERIAL_TYPES_ANY: &[&str] = &["", "원자재", "부자재", "소모품"];
const UNITS: &[&str] = &["EA", "KG", "M", "SET"];
const CUSTOMER_TYPES: &[&str] = &["매입", "매출", "매입/매출"];
const USE_YN: &[&str] = &["Y", "N"];
const EMPLOYEE_STATUS: &[&str] = &["재직", "휴직", "퇴사"];
const VESSEL_TYPES: &[&str] = &["컨테이너선", "LNG선", "유조선", "벌크선"];
const VESSEL_TYPES_ANY: &[&str] = &["", "컨테이너선", "LNG선", "유조선", "벌크선"];
const PROJECT_STATUS: &[&str] = &["계획", "진행", "완료"];
const MOVEMENT_TYPES: &[&str] = &["입고", "출고", "이동"];
const MOVEMENT_TYPES_ANY: &[&str] = &["", "입고", "출고", "이동"];
const ORDER_STATUS: &[&str] = &["작성", "승인", "완료"];
const ORDER_STATUS_ANY: &[&str] = &["", "작성", "승인", "완료"];

pub fn materials() -> Resource {
    Resource::new("자재", "materials", "materialId")
        .columns(vec![
            Column::number("자재코드", "materialId").read_only(),
            Column::text("자재명", "materialNm").required(),
            Column::select("자재유형", "materialType", MATERIAL_TYPES),
            Column::text("규격", "spec"),
            Column::select("단위", "unit", UNITS).required(),
            Column::number("단가", "unitPrice"),
        ])
        .search(vec![
            Column::text("자재명", "materialNm"),
            Column::select("자재유형", "materialType", MATERIAL_TYPES_ANY),
        ])
}

pub fn customers() -> Resource {
    Resource::new("거래처", "customers", "customerId")
        .natural_key()
        .bulk(BulkStyle::SaveAll)
        .insert_at(InsertPosition::Bottom)
        .columns(vec![
            Column::text("거래처코드", "customerId"),
            Column::text("거래처명", "customerNm").required(),
            Column::select("거래처유형", "customerType", CUSTOMER_TYPES),
            Column::text("사업자번호", "bizNo"),
            Column::text("대표자", "ceoNm"),
            Column::text("전화번호", "phone"),
            Column::text("주소", "address"),
        ])
        .search(vec![
            Column::text("거래처코드", "customerId"),
            Column::text("거래처명", "customerNm"),
        ])
}

pub fn departments() -> Resource {
    Resource::new("부서", "departments", "deptId")
        .natural_key()
        .bulk(BulkStyle::SaveAll)
        .columns(vec![
            Column::text("부서코드", "deptId"),
            Column::text("부서명", "deptNm").required(),
            Column::text("상위부서", "parentDeptId"),
            Column::select("사용여부", "useYn", USE_YN),
        ])
        .search(vec![Column::text("부서명", "deptNm")])
}

pub fn employees() -> Resource {
    Resource::new("사원", "employees", "empId")
        .natural_key()
        .columns(vec![
            Column::text("사번", "empId"),
            Column::text("성명", "empNm").required(),
            Column::text("부서코드", "deptId").required(),
            Column::text("직급", "position"),
            Column::text("이메일", "email"),
            Column::date("입사일", "hireDate"),
            Column::select("재직상태", "status", EMPLOYEE_STATUS),
        ])
        .search(vec![
            Column::text("성명", "empNm"),
            Column::text("부서코드", "deptId"),
        ])
}

pub fn vessels() -> Resource {
    Resource::new("선박", "vessels", "vesselId")
        .natural_key()
        .image("imageId")
        .columns(vec![
            Column::text("선체번호", "vesselId"),
            Column::text("선명", "vesselNm").required(),
            Column::select("선종", "vesselType", VESSEL_TYPES),
            Column::text("선주", "customerId").required(),
            Column::date("계약일", "contractDate"),
            Column::date("인도일", "deliveryDate"),
            Column::text("이미지", "imageId").read_only(),
        ])
        .search(vec![
            Column::text("선명", "vesselNm"),
            Column::select("선종", "vesselType", VESSEL_TYPES_ANY),
        ])
}

pub fn projects() -> Resource {
    Resource::new("프로젝트", "projects", "projectId")
        .natural_key()
        .columns(vec![
            Column::text("프로젝트코드", "projectId"),
            Column::text("프로젝트명", "projectNm").required(),
            Column::text("선체번호", "vesselId").required(),
            Column::date("시작일", "startDate"),
            Column::date("종료일", "endDate"),
            Column::select("상태", "status", PROJECT_STATUS),
        ])
        .search(vec![
            Column::text("프로젝트명", "projectNm"),
            Column::text("선체번호", "vesselId"),
            Column::date("시작일", "startDate"),
        ])
}

/// Lines are grouped per vessel
pub fn bom() -> Resource {
    Resource::new("BOM", "bom", "bomId")
        .tree("vesselId")
        .insert_at(InsertPosition::Bottom)
        .columns(vec![
            Column::number("BOM번호", "bomId").read_only(),
            Column::text("선체번호", "vesselId").required(),
            Column::number("자재코드", "materialId").required(),
            Column::text("자재명", "materialNm").read_only(),
            Column::number("수량", "quantity").required(),
            Column::select("단위", "unit", UNITS),
        ])
        .search(vec![Column::text("선체번호", "vesselId")])
}

/// Quantities are corrected directly in the grid
pub fn inventory() -> Resource {
    Resource::new("재고", "inventory", "inventoryId")
        .editable_grid()
        .columns(vec![
            Column::number("재고번호", "inventoryId").read_only(),
            Column::number("자재코드", "materialId").required(),
            Column::text("자재명", "materialNm").read_only(),
            Column::text("창고", "warehouse").required(),
            Column::text("위치", "location"),
            Column::number("수량", "quantity"),
            Column::number("안전재고", "safetyStock"),
        ])
        .search(vec![
            Column::text("자재명", "materialNm"),
            Column::text("창고", "warehouse"),
        ])
}

pub fn inventory_movements() -> Resource {
    Resource::new("입출고", "inventoryMovements", "movementId")
        .columns(vec![
            Column::number("이력번호", "movementId").read_only(),
            Column::number("자재코드", "materialId").required(),
            Column::select("구분", "movementType", MOVEMENT_TYPES),
            Column::number("수량", "quantity").required(),
            Column::date("일자", "movementDate").required(),
            Column::text("창고", "warehouse"),
            Column::text("비고", "remark"),
        ])
        .search(vec![
            Column::select("구분", "movementType", MOVEMENT_TYPES_ANY),
            Column::date("시작일", "fromDate"),
            Column::date("종료일", "toDate"),
        ])
}

pub fn purchase_orders() -> Resource {
    Resource::new("발주", "purchaseOrders", "poId")
        .details(SubResource {
            title: "발주 상세",
            segment: "details",
            key_field: "detailId",
            columns: vec![
                Column::number("순번", "detailId"),
                Column::number("자재코드", "materialId"),
                Column::text("자재명", "materialNm"),
                Column::number("수량", "quantity"),
                Column::number("단가", "unitPrice"),
                Column::number("금액", "amount"),
            ],
        })
        .columns(vec![
            Column::number("발주번호", "poId").read_only(),
            Column::text("거래처코드", "customerId").required(),
            Column::date("발주일", "orderDate").required(),
            Column::date("납기일", "dueDate"),
            Column::select("상태", "status", ORDER_STATUS),
            Column::number("합계금액", "totalAmount").read_only(),
        ])
        .search(vec![
            Column::text("거래처코드", "customerId"),
            Column::select("상태", "status", ORDER_STATUS_ANY),
            Column::date("발주일", "orderDate"),
        ])
}

pub fn sales_orders() -> Resource {
    Resource::new("수주", "salesOrders", "soId")
        .bulk(BulkStyle::SaveAll)
        .columns(vec![
            Column::number("수주번호", "soId").read_only(),
            Column::text("거래처코드", "customerId").required(),
            Column::text("선체번호", "vesselId"),
            Column::date("수주일", "orderDate").required(),
            Column::date("인도예정일", "deliveryDate"),
            Column::number("금액", "amount"),
            Column::select("상태", "status", ORDER_STATUS),
        ])
        .search(vec![
            Column::text("거래처코드", "customerId"),
            Column::select("상태", "status", ORDER_STATUS_ANY),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::resource::KeyPolicy;
    use rstest::rstest;

    #[rstest]
    #[case::materials(materials())]
    #[case::customers(customers())]
    #[case::departments(departments())]
    #[case::employees(employees())]
    #[case::vessels(vessels())]
    #[case::projects(projects())]
    #[case::bom(bom())]
    #[case::inventory(inventory())]
    #[case::movements(inventory_movements())]
    #[case::purchase_orders(purchase_orders())]
    #[case::sales_orders(sales_orders())]
    fn test_resource_is_consistent(#[case] resource: Resource) {
        let key = resource
            .column(resource.key_field)
            .unwrap_or_else(|| panic!("{}: key column missing", resource.path));

        // natural keys are typed in, server keys never are
        match resource.key_policy {
            KeyPolicy::Natural => assert!(!key.read_only, "{}", resource.path),
            KeyPolicy::ServerAssigned => assert!(key.read_only, "{}", resource.path),
        }

        let mut accessors: Vec<_> = resource.columns.iter().map(|c| c.accessor).collect();
        accessors.sort_unstable();
        accessors.dedup();
        assert_eq!(accessors.len(), resource.columns.len(), "{}", resource.path);

        assert!(!resource.search.is_empty(), "{}", resource.path);
        if let Some(field) = resource.tree_group {
            assert!(resource.column(field).is_some());
        }
        if let Some(field) = resource.image_field {
            assert!(resource.column(field).is_some_and(|c| c.read_only));
        }
    }

    #[test]
    fn test_materials_grid_header() {
        let resource = materials();
        assert_eq!(resource.column("materialNm").unwrap().header, "자재명");
    }
}
