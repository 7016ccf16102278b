#[cfg(test)]
mod tests {
    use crate::messages::{datatype, Header, PointCloud2, PointField};
    use crate::point_cloud::{CloudError, FieldReader};

    fn field(name: &str, offset: u32, datatype: u8) -> PointField {
        PointField {
            name: name.to_string(),
            offset,
            datatype,
            count: 1,
        }
    }

    /// 2 x 2 organized cloud, big endian, FLOAT64 coordinates, UINT16 label, rows padded
    /// by 4 bytes.
    fn organized_cloud() -> PointCloud2 {
        let points: [([f64; 3], u16); 4] = [
            ([0.0, 0.0, 1.0], 7),
            ([0.5, 0.0, 1.0], 3),
            ([0.0, 0.5, 1.25], 7),
            ([0.5, 0.5, 1.5], 0),
        ];
        let point_step = 26;
        let row_step = 2 * point_step + 4;
        let mut data = Vec::new();
        for row in 0..2 {
            for col in 0..2 {
                let (p, label) = points[row * 2 + col];
                for c in p {
                    data.extend_from_slice(&c.to_be_bytes());
                }
                data.extend_from_slice(&label.to_be_bytes());
            }
            data.extend_from_slice(&[0xAA; 4]);
        }
        PointCloud2 {
            header: Header::in_frame("camera"),
            height: 2,
            width: 2,
            fields: vec![
                field("x", 0, datatype::FLOAT64),
                field("y", 8, datatype::FLOAT64),
                field("z", 16, datatype::FLOAT64),
                field("label", 24, datatype::UINT16),
            ],
            is_bigendian: true,
            point_step,
            row_step,
            data,
            is_dense: true,
        }
    }

    #[test]
    fn test_organized_big_endian() {
        let cloud = organized_cloud();
        assert_eq!(cloud.len(), 4);
        let labeled = cloud.labeled_xyz("label").expect("readable cloud");
        let labels: Vec<i64> = labeled.iter().map(|(_, l)| *l).collect();
        assert_eq!(labels, vec![7, 3, 7, 0]);
        assert_eq!(labeled[2].0.y, 0.5);
        assert_eq!(labeled[2].0.z, 1.25);
        assert_eq!(labeled[3].0.x, 0.5);
    }

    #[test]
    fn test_dense_builders() {
        let cloud = PointCloud2::from_labeled_xyz(
            Header::in_frame("base"),
            &[([1.0, 2.0, 3.0], -1), ([4.0, 5.0, 6.0], 42)],
        );
        assert_eq!(cloud.point_step, 16);
        assert_eq!(cloud.row_step, 32);
        assert_eq!(cloud.data.len(), 32);

        let label = FieldReader::new(&cloud, "label").expect("label field");
        assert_eq!(label.get(0), -1.0);
        assert_eq!(label.get(1), 42.0);

        let xyz = cloud.xyz().expect("xyz");
        assert_eq!((xyz[1].x, xyz[1].y, xyz[1].z), (4.0, 5.0, 6.0));
    }

    #[test]
    fn test_float_label_field() {
        // Some segmenters store the class id as float
        let mut cloud = PointCloud2::from_xyz(Header::in_frame("base"), &[[0.0, 0.0, 0.0]]);
        cloud.fields.push(field("label", 12, datatype::FLOAT32));
        cloud.point_step = 16;
        cloud.row_step = 16;
        let mut data = Vec::new();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&7.0f32.to_le_bytes());
        cloud.data = data;

        let labeled = cloud.labeled_xyz("label").expect("readable");
        assert_eq!(labeled[0].1, 7);
    }

    #[test]
    fn test_unsupported_datatype() {
        let mut cloud = PointCloud2::from_xyz(Header::in_frame("base"), &[[0.0, 0.0, 0.0]]);
        cloud.fields.push(field("label", 12, 42));
        assert!(matches!(
            FieldReader::new(&cloud, "label"),
            Err(CloudError::UnsupportedDatatype { datatype: 42, .. })
        ));
    }

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud2::from_xyz(Header::in_frame("base"), &[]);
        assert!(cloud.is_empty());
        assert!(cloud.xyz().expect("empty is fine").is_empty());
    }
}
